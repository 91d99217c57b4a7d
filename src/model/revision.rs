//! Per-revision bookkeeping accumulated while a revision is parsed.

use crate::fs::Revnum;
use crate::model::rep::Rep;

/// Everything gathered about a single revision while walking its bytes.
///
/// Owned by the top-level traversal (see [`crate::query::Query`]); no live
/// file handle is kept here — handles are scoped to whichever driver
/// function is currently reading the revision's bytes.
#[derive(Debug, Clone)]
pub struct RevisionInfo {
    /// The revision number.
    pub revision: Revnum,
    /// Start of this revision's byte range within its pack or rev file.
    /// `0` for an unpacked revision.
    pub offset: u64,
    /// End (exclusive) of this revision's byte range. Equals the file size
    /// for an unpacked revision.
    pub end: u64,
    /// Byte offset of the changed-paths section, if located.
    pub changes: u64,
    /// Byte length of the changed-paths section.
    pub changes_len: u64,
    /// Number of changed-path records decoded from that section.
    pub change_count: u64,
    /// Number of directory node-revisions parsed in this revision.
    pub dir_noderev_count: u64,
    /// Number of file node-revisions parsed in this revision.
    pub file_noderev_count: u64,
    /// Total byte length of directory node-revision records.
    pub dir_noderev_size: u64,
    /// Total byte length of file node-revision records.
    pub file_noderev_size: u64,
    /// Representations physically stored in this revision's file, sorted
    /// ascending by offset.
    pub representations: Vec<Rep>,
}

impl RevisionInfo {
    /// Creates an empty accumulator for `revision`.
    pub fn new(revision: Revnum) -> Self {
        RevisionInfo {
            revision,
            offset: 0,
            end: 0,
            changes: 0,
            changes_len: 0,
            change_count: 0,
            dir_noderev_count: 0,
            file_noderev_count: 0,
            dir_noderev_size: 0,
            file_noderev_size: 0,
            representations: Vec::new(),
        }
    }
}
