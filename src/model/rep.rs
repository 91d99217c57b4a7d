//! Representation descriptors and the per-revision registry that
//! deduplicates them.

use serde::{Deserialize, Serialize};

use crate::fs::{RepLoc, Revnum};
use crate::model::revision::RevisionInfo;

/// What a representation's bytes were first seen to hold.
///
/// Set once, by the first node-revision that references the rep, and never
/// changed afterward — later references bump [`Rep::ref_count`] but leave
/// `kind` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepKind {
    /// Never reached via a node-revision (e.g. the [`Rep::null_base`]
    /// sentinel, or a delta base that no live node-revision points at).
    Unused,
    /// A directory's property list.
    DirProperty,
    /// A file's property list.
    FileProperty,
    /// A directory's contents listing.
    Directory,
    /// A file's contents.
    File,
}

impl Default for RepKind {
    fn default() -> Self {
        RepKind::Unused
    }
}

/// A single stored representation: the bytes backing one file's content or
/// one node's property list.
///
/// Identified within its owning revision by `offset`; referenced from
/// other revisions (via rep-sharing) as a `(revision, offset)` pair rather
/// than by pointer, so the representation graph never needs reference
/// counting beyond the semantic [`Rep::ref_count`] below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rep {
    /// Absolute byte offset within `revision`'s rev/pack file.
    pub offset: u64,
    /// On-disk byte length, possibly delta-encoded.
    pub size: u64,
    /// Length after delta reconstruction; equals `size` when not
    /// deltified.
    pub expanded_size: u64,
    /// The revision whose rev/pack file physically contains these bytes.
    pub revision: Revnum,
    /// Number of node-revisions referencing this representation.
    pub ref_count: u32,
    /// Length of the representation's header line. Physical addressing
    /// mode only; `0` otherwise.
    pub header_size: u32,
    /// What this representation was first reached as.
    pub kind: RepKind,
}

impl Rep {
    fn new(loc: RepLoc) -> Self {
        Rep {
            offset: loc.offset,
            size: loc.size,
            expanded_size: loc.expanded_size,
            revision: loc.revision,
            ref_count: 0,
            header_size: 0,
            kind: RepKind::Unused,
        }
    }

    /// The sentinel representing the implicit empty base of a delta chain
    /// that has no explicit base. Never mutated, never interned into a
    /// revision's representation vector, and never contributes to
    /// statistics — it exists purely so delta-chain-walking code has a
    /// value to point at.
    pub fn null_base(revision: Revnum) -> Self {
        Rep {
            offset: 0,
            size: 0,
            expanded_size: 0,
            revision,
            ref_count: 0,
            header_size: 0,
            kind: RepKind::Unused,
        }
    }
}

/// Identifies an interned [`Rep`] by the revision owning it and its
/// position within that revision's representation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepRef {
    /// Index into the top-level revision array (equal to the revision
    /// number, since revisions are appended in order starting at 0).
    pub rev_idx: usize,
    /// Index into that revision's `representations` vector.
    pub rep_idx: usize,
}

/// Binary-searches `revision`'s representation vector for `offset`.
///
/// Returns `Ok(index)` on a hit, `Err(insertion_index)` on a miss — the
/// index at which a new `Rep` would need to be inserted to keep the
/// vector sorted.
pub fn find(
    revisions: &[RevisionInfo],
    revision: Revnum,
    offset: u64,
) -> Result<usize, usize> {
    revisions[revision as usize]
        .representations
        .binary_search_by_key(&offset, |r| r.offset)
}

/// Looks up the representation described by `loc`, creating it (with
/// `ref_count = 0`, `kind = Unused`) if this is the first time it has been
/// seen.
///
/// `loc.revision` identifies which revision's vector owns the rep; it is
/// always a revision that has already been appended to `revisions` (the
/// current one, for a freshly written rep, or an earlier one, for a
/// rep-shared reference to already-written bytes).
pub fn intern(revisions: &mut [RevisionInfo], loc: RepLoc) -> RepRef {
    let rev_idx = loc.revision as usize;
    match find(revisions, loc.revision, loc.offset) {
        Ok(rep_idx) => RepRef { rev_idx, rep_idx },
        Err(insert_at) => {
            revisions[rev_idx]
                .representations
                .insert(insert_at, Rep::new(loc));
            RepRef {
                rev_idx,
                rep_idx: insert_at,
            }
        }
    }
}
