//! The filesystem boundary the traversal driver reads through.
//!
//! Everything in this module is a seam: [`FsBackend`] and [`RevisionFile`]
//! describe what the engine needs from a real repository without this crate
//! implementing one. Embedders supply a concrete backend; the only backend
//! shipped here is [`memory::InMemoryFs`], used by tests and by the CLI's
//! synthetic demo mode.

pub mod memory;

use crate::error::Result;

/// A revision number. Non-negative by construction (repository revision 0
/// is the empty root revision).
pub type Revnum = u64;

/// Which of the two addressing schemes a repository (or one of its
/// shards) uses to locate items within a rev/pack file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// Locations are absolute byte offsets; traversal follows the node
    /// tree recursively.
    Physical,
    /// Locations are resolved via a path-to-location index; traversal is
    /// a linear walk over the file.
    Logical,
}

/// Identifies a single node-revision: the revision that introduced it and
/// its location (a physical byte offset in physical-addressing mode, an
/// opaque logical item index in logical-addressing mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRevId {
    /// Revision owning this node-revision.
    pub revision: Revnum,
    /// Physical offset (physical mode) or logical item index (logical
    /// mode) identifying the node-revision within that revision.
    pub item: u64,
}

/// The kind of filesystem object a node-revision describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A file.
    File,
    /// A directory.
    Directory,
}

/// A reference to a representation as embedded inline in a node-revision
/// record (the `text:` / `props:` line), before it has been interned into
/// a [`crate::model::rep::Rep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepLoc {
    /// Revision whose rev/pack file physically holds these bytes.
    pub revision: Revnum,
    /// Absolute byte offset within that revision's rev/pack file.
    pub offset: u64,
    /// On-disk length, possibly delta-encoded.
    pub size: u64,
    /// Length after delta reconstruction.
    pub expanded_size: u64,
}

/// A decoded node-revision record, as produced by [`FsBackend::read_noderev`].
#[derive(Debug, Clone)]
pub struct NodeRev {
    /// File or directory.
    pub kind: NodeKind,
    /// The node's content representation, if any.
    pub data_rep: Option<RepLoc>,
    /// The node's property-list representation, if any.
    pub prop_rep: Option<RepLoc>,
    /// The node-revision this one was derived from, if any. `None` marks a
    /// fresh addition rather than an incremental modification.
    pub predecessor_id: Option<NodeRevId>,
    /// Repository path this node-revision was created at.
    pub created_path: String,
    /// Byte length of the record as decoded, terminated by `"\n\n"` or the
    /// end of the revision.
    pub record_len: u64,
}

/// One entry of a decoded directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Entry name within the directory.
    pub name: String,
    /// The node-revision the entry points at.
    pub id: NodeRevId,
}

/// Header framing information for a representation, read from the rep's
/// own offset. Physical addressing mode only.
#[derive(Debug, Clone, Copy)]
pub struct RepHeader {
    /// Length in bytes of the representation's header line.
    pub header_size: u32,
}

/// The kind of item a p2l index entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    /// A node-revision record.
    NodeRev,
    /// A changed-paths ("changes") section.
    Changes,
    /// Anything else the index tracks (representations, the revision
    /// trailer, padding) that this engine has no use for.
    Other(u8),
}

/// One entry returned by [`FsBackend::p2l_index_lookup`].
#[derive(Debug, Clone, Copy)]
pub struct P2lEntry {
    /// Absolute byte offset of the item within the file.
    pub offset: u64,
    /// Byte length of the item.
    pub size: u64,
    /// What kind of item this is.
    pub item_type: ItemType,
    /// The node-revision or changes-list identity this item belongs to.
    pub item: NodeRevId,
}

/// A single open pack or rev file, read by absolute offset.
///
/// Implementations are scoped to one file: callers open one per pack (or
/// per unpacked revision) and drop it before moving on, per the resource
/// discipline in `spec.md` §5.
pub trait RevisionFile {
    /// Total size of the file in bytes.
    fn len(&mut self) -> Result<u64>;

    /// Reads exactly `len` bytes starting at `offset`.
    fn read_at(&mut self, offset: u64, len: u64) -> Result<Vec<u8>>;
}

/// Everything the traversal driver needs from the underlying repository.
///
/// This trait is the boundary named "out of scope" in `spec.md` §1: the
/// engine calls through it but never implements a production repository
/// reader itself.
pub trait FsBackend {
    /// The highest revision present in the repository.
    fn youngest_revision(&self) -> Revnum;

    /// The lowest revision not yet folded into a pack (i.e. the first
    /// unpacked revision). Revisions below this are packed in shards of
    /// [`FsBackend::shard_size`].
    fn min_unpacked_revision(&self) -> Revnum;

    /// Number of revisions per pack shard, or `0` if the repository is not
    /// sharded.
    fn shard_size(&self) -> u64;

    /// Whether this repository uses logical (index-based) addressing
    /// rather than physical (offset-based) addressing.
    fn use_logical_addressing(&self) -> bool;

    /// Opens the pack file containing `rev`, or the standalone rev file if
    /// the repository is unsharded / `rev` is unpacked.
    fn open_pack_or_rev(&self, rev: Revnum) -> Result<Box<dyn RevisionFile>>;

    /// Looks up the byte offset at which `rev` begins within its pack,
    /// via the pack's manifest.
    fn packed_offset(&self, rev: Revnum) -> Result<u64>;

    /// Reads the header line of the representation whose bytes begin at
    /// `offset` within `file`. Physical addressing mode only.
    fn read_rep_header(&self, file: &mut dyn RevisionFile, offset: u64) -> Result<RepHeader>;

    /// Decodes the node-revision record at `offset` within `file`,
    /// belonging to `revision`.
    fn read_noderev(
        &self,
        file: &mut dyn RevisionFile,
        offset: u64,
        revision: Revnum,
    ) -> Result<NodeRev>;

    /// Decodes the directory listing held by a directory node-revision's
    /// data representation.
    fn rep_contents_dir(
        &self,
        file: &mut dyn RevisionFile,
        noderev: &NodeRev,
    ) -> Result<Vec<DirEntry>>;

    /// The highest byte offset covered by `revision`'s path-to-location
    /// index. Logical addressing mode only.
    fn p2l_max_offset(&self, file: &mut dyn RevisionFile, revision: Revnum) -> Result<u64>;

    /// Looks up the p2l index entries describing the items located at or
    /// after `offset`, up to `page_size` bytes of file coverage. Logical
    /// addressing mode only.
    fn p2l_index_lookup(
        &self,
        file: &mut dyn RevisionFile,
        revision: Revnum,
        offset: u64,
        page_size: u64,
    ) -> Result<Vec<P2lEntry>>;
}
