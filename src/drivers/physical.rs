//! Physical (offset-based) addressing driver: reads one whole pack shard
//! or one unpacked revision file and recursively walks its node tree.

use crate::error::Result;
use crate::fs::{FsBackend, Revnum};
use crate::model::revision::RevisionInfo;
use crate::parser;
use crate::stats::Stats;

/// Reads and parses every revision in the pack shard based at
/// `base_revision`, sharing a single open file handle across the shard.
pub fn process_pack(
    fs: &dyn FsBackend,
    base_revision: Revnum,
    revisions: &mut Vec<RevisionInfo>,
    stats: &mut Stats,
    cancel: &mut dyn FnMut() -> Result<()>,
) -> Result<()> {
    let shard_size = fs.shard_size();
    let mut file = fs.open_pack_or_rev(base_revision)?;
    let file_size = file.len()?;
    for i in 0..shard_size {
        cancel()?;
        let revision = base_revision + i;
        let start = fs.packed_offset(revision)?;
        let end = if i + 1 < shard_size {
            fs.packed_offset(revision + 1)?
        } else {
            file_size
        };
        process_one_revision(fs, file.as_mut(), revision, start, end, revisions, stats)?;
    }
    Ok(())
}

/// Reads and parses a single, unpacked revision file.
pub fn process_rev(
    fs: &dyn FsBackend,
    revision: Revnum,
    revisions: &mut Vec<RevisionInfo>,
    stats: &mut Stats,
    cancel: &mut dyn FnMut() -> Result<()>,
) -> Result<()> {
    cancel()?;
    let mut file = fs.open_pack_or_rev(revision)?;
    let file_size = file.len()?;
    process_one_revision(fs, file.as_mut(), revision, 0, file_size, revisions, stats)
}

fn process_one_revision(
    fs: &dyn FsBackend,
    file: &mut dyn crate::fs::RevisionFile,
    revision: Revnum,
    start: u64,
    end: u64,
    revisions: &mut Vec<RevisionInfo>,
    stats: &mut Stats,
) -> Result<()> {
    revisions[revision as usize].offset = start;
    revisions[revision as usize].end = end;

    let bytes = file.read_at(start, end - start)?;
    let trailer = parser::parse_revision_trailer(&bytes)?;

    let changes_start = (trailer.changes_offset.saturating_sub(start)) as usize;
    let changes_bytes = &bytes[changes_start.min(trailer.trailer_start)..trailer.trailer_start];
    {
        let info = &mut revisions[revision as usize];
        info.changes = trailer.changes_offset;
        info.changes_len = changes_bytes.len() as u64;
        info.change_count = parser::decode_change_count(changes_bytes);
    }

    parser::parse_noderev_tree(fs, file, trailer.root_offset, revision, revisions, stats)
}
