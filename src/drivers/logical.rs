//! Logical (index-based) addressing driver: walks a pack shard or
//! unpacked revision file linearly via its path-to-location index rather
//! than recursing through the node tree.

use crate::error::{Error, Result};
use crate::fs::{FsBackend, ItemType, Revnum};
use crate::model::revision::RevisionInfo;
use crate::parser;
use crate::stats::Stats;

/// Walks the p2l index of the shard (or unpacked revision) rooted at
/// `base_revision`, dispatching each entry to the node-revision parser or
/// the changed-paths counter.
pub fn process_shard(
    fs: &dyn FsBackend,
    base_revision: Revnum,
    revisions: &mut Vec<RevisionInfo>,
    stats: &mut Stats,
    page_size: u64,
    cancel: &mut dyn FnMut() -> Result<()>,
) -> Result<()> {
    let mut file = fs.open_pack_or_rev(base_revision)?;
    let file_len = file.len()?;
    let max_offset = fs.p2l_max_offset(file.as_mut(), base_revision)?;

    // The whole-shard byte length is recorded on the first revision only,
    // so the total-size aggregator doesn't double-count the rest of the
    // shard's (unaddressed, in this mode) byte range.
    revisions[base_revision as usize].offset = 0;
    revisions[base_revision as usize].end = file_len;

    // Guarantees at least one cancel check per revision even when the
    // index covers zero blocks (an empty shard).
    cancel()?;

    let mut pos = 0u64;
    while pos < max_offset {
        cancel()?;
        let entries = fs.p2l_index_lookup(file.as_mut(), base_revision, pos, page_size)?;
        for entry in entries {
            if entry.size == 0 || entry.offset < pos {
                continue;
            }
            if entry.offset >= file_len {
                return Err(Error::IndexInconsistent(format!(
                    "p2l entry at offset {} exceeds file size {}",
                    entry.offset, file_len
                )));
            }
            match entry.item_type {
                ItemType::NodeRev => {
                    parser::parse_noderev_logical(
                        fs,
                        file.as_mut(),
                        entry.offset,
                        entry.item.revision,
                        revisions,
                        stats,
                    )?;
                }
                ItemType::Changes => {
                    let bytes = file.as_mut().read_at(entry.offset, entry.size)?;
                    let count = parser::decode_change_count(&bytes);
                    let info = &mut revisions[entry.item.revision as usize];
                    info.changes = entry.offset;
                    info.change_count = count;
                    info.changes_len += entry.size;
                }
                ItemType::Other(_) => {}
            }
        }
        pos += page_size;
    }
    Ok(())
}
