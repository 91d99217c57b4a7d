//! Decodes one revision's bytes into its node-revision tree, interning
//! representations and updating per-revision counters along the way.
//!
//! Node-revision *decoding* is delegated to [`crate::fs::FsBackend`]; what
//! lives here is everything `spec.md` §4.3 keeps in scope: dedup via
//! [`crate::model::rep::intern`], directory recursion, the revision
//! trailer format, and changed-paths-section counting.

use crate::error::{Error, Result};
use crate::fs::{AddressingMode, FsBackend, NodeKind, Revnum, RevisionFile};
use crate::model::rep::{self, RepKind};
use crate::model::revision::RevisionInfo;
use crate::stats::Stats;

/// Longest trailer line this parser will accept before treating the
/// revision as corrupt, guarding against a missing newline turning the
/// entire file into one "line".
const MAX_TRAILER_LINE: usize = 64;

/// The decoded trailer line of a physically-addressed revision.
#[derive(Debug, Clone, Copy)]
pub struct RevisionTrailer {
    /// Absolute file offset of the root node-revision.
    pub root_offset: u64,
    /// Absolute file offset of the changed-paths section.
    pub changes_offset: u64,
    /// Offset of the trailer line itself, relative to the start of the
    /// byte slice that was parsed — callers use this to find the end of
    /// the changed-paths section.
    pub trailer_start: usize,
}

/// Parses the two-integer trailer line physical-addressing revisions end
/// with: `<root_noderev_offset> <changes_offset>\n`.
pub fn parse_revision_trailer(bytes: &[u8]) -> Result<RevisionTrailer> {
    if bytes.last() != Some(&b'\n') {
        return Err(Error::Corrupt("trailing newline missing".into()));
    }
    let body = &bytes[..bytes.len() - 1];
    let line_start = body
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let line = &body[line_start..];
    if line.len() > MAX_TRAILER_LINE {
        return Err(Error::Corrupt("final line too long".into()));
    }
    let parse = || -> Option<(u64, u64)> {
        let line = std::str::from_utf8(line).ok()?;
        let mut parts = line.splitn(2, ' ');
        let root = parts.next()?.parse().ok()?;
        let changes = parts.next()?.parse().ok()?;
        Some((root, changes))
    };
    let (root_offset, changes_offset) =
        parse().ok_or_else(|| Error::Corrupt("missing separator".into()))?;
    Ok(RevisionTrailer {
        root_offset,
        changes_offset,
        trailer_start: line_start,
    })
}

/// Counts the changed-path records in a changed-paths section: each
/// record is two lines, so the count is half the number of `'\n'` bytes.
pub fn decode_change_count(bytes: &[u8]) -> u64 {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count() as u64;
    newlines / 2
}

/// Parses every node-revision reachable from `root_offset` within
/// `revision`, in physical-addressing mode.
///
/// Directory recursion is an explicit work-stack rather than native Rust
/// recursion, per `spec.md` §9, so pathologically deep trees cannot blow
/// the call stack.
pub fn parse_noderev_tree(
    fs: &dyn FsBackend,
    file: &mut dyn RevisionFile,
    root_offset: u64,
    revision: Revnum,
    revisions: &mut Vec<RevisionInfo>,
    stats: &mut Stats,
) -> Result<()> {
    let mut stack = vec![root_offset];
    while let Some(offset) = stack.pop() {
        let children = record_noderev(
            fs,
            file,
            offset,
            revision,
            revisions,
            stats,
            AddressingMode::Physical,
        )?;
        stack.extend(children);
    }
    Ok(())
}

/// Parses exactly one node-revision record at `offset`, in
/// logical-addressing mode. No recursion: the logical driver's index walk
/// visits every node-revision in the revision on its own.
pub fn parse_noderev_logical(
    fs: &dyn FsBackend,
    file: &mut dyn RevisionFile,
    offset: u64,
    revision: Revnum,
    revisions: &mut Vec<RevisionInfo>,
    stats: &mut Stats,
) -> Result<()> {
    record_noderev(
        fs,
        file,
        offset,
        revision,
        revisions,
        stats,
        AddressingMode::Logical,
    )?;
    Ok(())
}

/// Decodes the node-revision at `offset`, interns its representations,
/// updates `revisions[revision]`'s counters, and (physical mode only)
/// returns the offsets of directory children that still need visiting.
fn record_noderev(
    fs: &dyn FsBackend,
    file: &mut dyn RevisionFile,
    offset: u64,
    revision: Revnum,
    revisions: &mut Vec<RevisionInfo>,
    stats: &mut Stats,
    mode: AddressingMode,
) -> Result<Vec<u64>> {
    let noderev = fs.read_noderev(file, offset, revision)?;
    let plain_added = noderev.predecessor_id.is_none();
    let mut recurse_into_directory = false;

    if let Some(loc) = noderev.data_rep {
        let kind = match noderev.kind {
            NodeKind::Directory => RepKind::Directory,
            NodeKind::File => RepKind::File,
        };
        let first = reference_rep(
            fs,
            file,
            revisions,
            stats,
            loc,
            kind,
            &noderev.created_path,
            plain_added,
            mode,
        )?;
        if first && matches!(noderev.kind, NodeKind::Directory) && mode == AddressingMode::Physical
        {
            recurse_into_directory = true;
        }
    }

    if let Some(loc) = noderev.prop_rep {
        let kind = match noderev.kind {
            NodeKind::Directory => RepKind::DirProperty,
            NodeKind::File => RepKind::FileProperty,
        };
        reference_rep(
            fs,
            file,
            revisions,
            stats,
            loc,
            kind,
            &noderev.created_path,
            plain_added,
            mode,
        )?;
    }

    {
        let info = &mut revisions[revision as usize];
        match noderev.kind {
            NodeKind::Directory => {
                info.dir_noderev_count += 1;
                info.dir_noderev_size += noderev.record_len;
            }
            NodeKind::File => {
                info.file_noderev_count += 1;
                info.file_noderev_size += noderev.record_len;
            }
        }
    }

    if recurse_into_directory {
        let entries = fs.rep_contents_dir(file, &noderev)?;
        let children = entries
            .into_iter()
            .filter(|entry| entry.id.revision == revision)
            .map(|entry| entry.id.item)
            .collect();
        return Ok(children);
    }
    Ok(Vec::new())
}

/// Interns the representation at `loc`, records a change on first
/// reference (setting `kind` and, in physical mode, `header_size`), and
/// bumps `ref_count`. Returns whether this call was the first reference.
#[allow(clippy::too_many_arguments)]
fn reference_rep(
    fs: &dyn FsBackend,
    file: &mut dyn RevisionFile,
    revisions: &mut Vec<RevisionInfo>,
    stats: &mut Stats,
    loc: crate::fs::RepLoc,
    kind: RepKind,
    path: &str,
    plain_added: bool,
    mode: AddressingMode,
) -> Result<bool> {
    let rref = rep::intern(revisions, loc);
    let first = revisions[rref.rev_idx].representations[rref.rep_idx].ref_count == 0;
    if !first {
        revisions[rref.rev_idx].representations[rref.rep_idx].ref_count += 1;
        return Ok(false);
    }

    if mode == AddressingMode::Physical {
        match fs.read_rep_header(file, loc.offset) {
            Ok(header) => {
                revisions[rref.rev_idx].representations[rref.rep_idx].header_size =
                    header.header_size;
            }
            Err(err) => {
                // The delta chain backing this rep couldn't be resolved.
                // Leave it `Unused` (ref_count stays 0) rather than
                // aborting the whole traversal.
                tracing::warn!(
                    revision = loc.revision,
                    offset = loc.offset,
                    error = %err,
                    "representation header unresolved, leaving Unused"
                );
                return Ok(false);
            }
        }
    }
    revisions[rref.rev_idx].representations[rref.rep_idx].kind = kind;
    stats.add_change(loc.size, loc.expanded_size, loc.revision, path, kind, plain_added);
    revisions[rref.rev_idx].representations[rref.rep_idx].ref_count += 1;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailer_happy_path() {
        let t = parse_revision_trailer(b"100 200\n").unwrap();
        assert_eq!((t.root_offset, t.changes_offset), (100, 200));
    }

    #[test]
    fn trailer_with_preceding_content() {
        let bytes = b"blah blah blah\n100 200\n";
        let t = parse_revision_trailer(bytes).unwrap();
        assert_eq!((t.root_offset, t.changes_offset), (100, 200));
        assert_eq!(t.trailer_start, "blah blah blah\n".len());
    }

    #[test]
    fn trailer_missing_newline() {
        let err = parse_revision_trailer(b"100 200").unwrap_err();
        assert!(matches!(err, Error::Corrupt(m) if m == "trailing newline missing"));
    }

    #[test]
    fn trailer_missing_separator() {
        let err = parse_revision_trailer(b"100200\n").unwrap_err();
        assert!(matches!(err, Error::Corrupt(m) if m == "missing separator"));
    }

    #[test]
    fn trailer_too_long() {
        let long_line = "1".repeat(100) + " 2\n";
        let err = parse_revision_trailer(long_line.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Corrupt(m) if m == "final line too long"));
    }

    #[test]
    fn change_count_law() {
        let bytes = b"/trunk/a.txt\nM \n/trunk/b.txt\nA \n/trunk/c.txt\nD \n";
        assert_eq!(decode_change_count(bytes), 3);
        assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count() as u64, 6);
    }
}
