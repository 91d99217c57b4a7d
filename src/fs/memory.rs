//! [`InMemoryFs`]: a synthetic, self-contained [`FsBackend`] used by this
//! crate's own tests and by `revstats-cli`'s `--demo` mode.
//!
//! Decoding a real rev/pack file is out of scope for this crate (see the
//! module doc on [`super`]), so this double does not attempt to reproduce
//! FSFS's actual node-revision or p2l-index wire format. It only has to be
//! *self-consistent*: the two things the engine itself decodes directly —
//! the physical-mode revision trailer and the changed-paths newline count —
//! are generated as real bytes; everything else ([`NodeRev`],
//! [`DirEntry`], [`RepHeader`], [`P2lEntry`]) is handed back from a
//! structured table keyed the same way [`FsBackend`] callers key it.

use std::collections::HashMap;

use super::{
    DirEntry, FsBackend, ItemType, NodeKind, NodeRev, NodeRevId, P2lEntry, RepHeader, RepLoc,
    RevisionFile, Revnum,
};
use crate::error::{Error, Result};

/// Declarative construction of an [`InMemoryFs`].
///
/// Call [`InMemoryRepoBuilder::logical_addressing`] and
/// [`InMemoryRepoBuilder::shard_size`] before adding revisions; both are
/// consulted as each revision is appended, not just at [`build`][Self::build]
/// time.
#[derive(Default)]
pub struct InMemoryRepoBuilder {
    shard_size: u64,
    min_unpacked: Revnum,
    logical: bool,
    revisions: Vec<RevisionSpec>,
}

#[derive(Default)]
struct RevisionSpec {
    root: u64,
    changes: Vec<String>,
    nodes: HashMap<u64, NodeRev>,
    dirs: HashMap<(Revnum, u64), Vec<DirEntry>>,
    headers: HashMap<u64, Option<RepHeader>>,
    p2l_nodes: Vec<P2lEntry>,
}

impl InMemoryRepoBuilder {
    /// Starts an empty, physical-addressing, unsharded repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs revisions below `min_unpacked_revision` into shards of `n`.
    /// `0` (the default) leaves every revision unpacked.
    pub fn shard_size(mut self, n: u64) -> Self {
        self.shard_size = n;
        self
    }

    /// The lowest revision not folded into a pack.
    pub fn min_unpacked_revision(mut self, r: Revnum) -> Self {
        self.min_unpacked = r;
        self
    }

    /// Switches to logical (index-based) addressing.
    pub fn logical_addressing(mut self, v: bool) -> Self {
        self.logical = v;
        self
    }

    /// Appends a new, empty revision and returns its number.
    pub fn add_revision(&mut self) -> Revnum {
        self.revisions.push(RevisionSpec::default());
        (self.revisions.len() - 1) as u64
    }

    /// Records the offset of `revision`'s root node-revision.
    pub fn set_root(&mut self, revision: Revnum, offset: u64) {
        self.revisions[revision as usize].root = offset;
    }

    /// Appends one changed-path record to `revision`'s changes section.
    pub fn add_change(&mut self, revision: Revnum, path: &str) {
        self.revisions[revision as usize].changes.push(path.to_string());
    }

    /// Registers a decoded node-revision at `offset` within `revision`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_node(
        &mut self,
        revision: Revnum,
        offset: u64,
        kind: NodeKind,
        created_path: &str,
        predecessor_id: Option<NodeRevId>,
        data_rep: Option<RepLoc>,
        prop_rep: Option<RepLoc>,
        record_len: u64,
    ) {
        let logical = self.logical;
        let spec = &mut self.revisions[revision as usize];
        spec.nodes.insert(
            offset,
            NodeRev {
                kind,
                data_rep,
                prop_rep,
                predecessor_id,
                created_path: created_path.to_string(),
                record_len,
            },
        );
        if logical {
            spec.p2l_nodes.push(P2lEntry {
                offset,
                size: record_len.max(1),
                item_type: ItemType::NodeRev,
                item: NodeRevId { revision, item: offset },
            });
        }
    }

    /// Registers the directory listing backing the representation at
    /// `listing`. `rep_contents_dir` is keyed by the directory's own data
    /// representation rather than by path, since two revisions' directory
    /// node-revisions can share a `created_path` while pointing at
    /// different listings.
    pub fn set_dir_entries(&mut self, listing: RepLoc, entries: Vec<DirEntry>) {
        self.revisions[listing.revision as usize]
            .dirs
            .insert((listing.revision, listing.offset), entries);
    }

    /// Registers the rep header for the representation located at
    /// `(revision, offset)`. Pass `header_size: None` to simulate a delta
    /// chain that cannot be resolved.
    pub fn add_rep_header(&mut self, revision: Revnum, offset: u64, header_size: Option<u32>) {
        self.revisions[revision as usize]
            .headers
            .insert(offset, header_size.map(|header_size| RepHeader { header_size }));
    }

    /// Assembles the declared revisions into an [`InMemoryFs`], generating
    /// the trailer and changed-paths bytes the physical and logical
    /// drivers actually parse.
    pub fn build(self) -> InMemoryFs {
        let youngest = self.revisions.len().saturating_sub(1) as u64;
        let mut files: HashMap<Revnum, Vec<u8>> = HashMap::new();
        let mut packed_offset = HashMap::new();
        let mut nodes = HashMap::new();
        let mut dirs = HashMap::new();
        let mut headers = HashMap::new();
        let mut p2l: HashMap<Revnum, Vec<P2lEntry>> = HashMap::new();

        for (rev_idx, spec) in self.revisions.into_iter().enumerate() {
            let revision = rev_idx as u64;
            let file_key = if self.shard_size > 0 && revision < self.min_unpacked {
                revision - revision % self.shard_size
            } else {
                revision
            };
            let buffer = files.entry(file_key).or_default();
            let start = buffer.len() as u64;
            let changes_bytes = encode_changes(&spec.changes);
            let changes_offset = start;

            if self.logical {
                p2l.entry(file_key).or_default().push(P2lEntry {
                    offset: changes_offset,
                    size: changes_bytes.len() as u64,
                    item_type: ItemType::Changes,
                    item: NodeRevId { revision, item: 0 },
                });
                buffer.extend_from_slice(&changes_bytes);
                p2l.entry(file_key).or_default().extend(spec.p2l_nodes);
                let highest = p2l[&file_key]
                    .iter()
                    .map(|e| e.offset + e.size)
                    .max()
                    .unwrap_or(buffer.len() as u64);
                if highest as usize > buffer.len() {
                    buffer.resize(highest as usize, 0);
                }
            } else {
                buffer.extend_from_slice(&changes_bytes);
                let trailer = format!("{} {}\n", spec.root, changes_offset);
                buffer.extend_from_slice(trailer.as_bytes());
            }

            packed_offset.insert(revision, start);
            for (offset, node) in spec.nodes {
                nodes.insert((revision, offset), node);
            }
            for (key, entries) in spec.dirs {
                dirs.insert(key, entries);
            }
            for (offset, header) in spec.headers {
                headers.insert(offset, header);
            }
        }

        InMemoryFs {
            youngest,
            min_unpacked: self.min_unpacked,
            shard_size: self.shard_size,
            logical: self.logical,
            files,
            packed_offset,
            nodes,
            dirs,
            headers,
            p2l,
        }
    }
}

/// Two lines per changed path, matching the real format closely enough
/// that [`crate::parser::decode_change_count`]'s newline-counting law
/// holds: one path line, one change-kind line.
fn encode_changes(paths: &[String]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for path in paths {
        bytes.extend_from_slice(path.as_bytes());
        bytes.push(b'\n');
        bytes.extend_from_slice(b"M \n");
    }
    bytes
}

/// A synthetic repository built by [`InMemoryRepoBuilder`].
pub struct InMemoryFs {
    youngest: Revnum,
    min_unpacked: Revnum,
    shard_size: u64,
    logical: bool,
    files: HashMap<Revnum, Vec<u8>>,
    packed_offset: HashMap<Revnum, u64>,
    nodes: HashMap<(Revnum, u64), NodeRev>,
    dirs: HashMap<(Revnum, u64), Vec<DirEntry>>,
    headers: HashMap<u64, Option<RepHeader>>,
    p2l: HashMap<Revnum, Vec<P2lEntry>>,
}

impl InMemoryFs {
    fn file_key(&self, rev: Revnum) -> Revnum {
        if self.shard_size > 0 && rev < self.min_unpacked {
            rev - rev % self.shard_size
        } else {
            rev
        }
    }

    /// A tiny three-revision, physical-addressing demo repository: revision
    /// 1 adds a file under a new directory, revision 2 modifies that file
    /// (reusing its property representation, to exercise rep-sharing).
    pub fn demo() -> InMemoryFs {
        let mut b = InMemoryRepoBuilder::new();
        let r0 = b.add_revision();
        b.set_root(r0, 10);
        b.add_node(r0, 10, NodeKind::Directory, "/", None, None, None, 40);

        let r1 = b.add_revision();
        b.set_root(r1, 110);
        let data_loc = RepLoc { revision: r1, offset: 120, size: 48, expanded_size: 48 };
        let prop_loc = RepLoc { revision: r1, offset: 170, size: 16, expanded_size: 16 };
        let trunk_listing_r1 = RepLoc { revision: r1, offset: 115, size: 20, expanded_size: 20 };
        b.add_rep_header(r1, data_loc.offset, Some(5));
        b.add_rep_header(r1, prop_loc.offset, Some(5));
        b.add_rep_header(r1, trunk_listing_r1.offset, Some(5));
        b.add_node(
            r1,
            130,
            NodeKind::File,
            "/trunk/hello.txt",
            None,
            Some(data_loc),
            Some(prop_loc),
            60,
        );
        b.add_node(
            r1,
            110,
            NodeKind::Directory,
            "/trunk",
            Some(NodeRevId { revision: r0, item: 10 }),
            Some(trunk_listing_r1),
            None,
            50,
        );
        b.set_dir_entries(
            trunk_listing_r1,
            vec![DirEntry {
                name: "hello.txt".into(),
                id: NodeRevId { revision: r1, item: 130 },
            }],
        );
        b.add_change(r1, "/trunk/hello.txt");
        b.add_change(r1, "/trunk");

        let r2 = b.add_revision();
        b.set_root(r2, 210);
        let data_loc_2 = RepLoc { revision: r2, offset: 220, size: 52, expanded_size: 52 };
        let trunk_listing_r2 = RepLoc { revision: r2, offset: 205, size: 20, expanded_size: 20 };
        b.add_rep_header(r2, data_loc_2.offset, Some(5));
        b.add_rep_header(r2, trunk_listing_r2.offset, Some(5));
        b.add_node(
            r2,
            230,
            NodeKind::File,
            "/trunk/hello.txt",
            Some(NodeRevId { revision: r1, item: 130 }),
            Some(data_loc_2),
            Some(prop_loc),
            60,
        );
        b.add_node(
            r2,
            210,
            NodeKind::Directory,
            "/trunk",
            Some(NodeRevId { revision: r1, item: 110 }),
            Some(trunk_listing_r2),
            None,
            50,
        );
        b.set_dir_entries(
            trunk_listing_r2,
            vec![DirEntry {
                name: "hello.txt".into(),
                id: NodeRevId { revision: r2, item: 230 },
            }],
        );
        b.add_change(r2, "/trunk/hello.txt");
        b.add_change(r2, "/trunk");

        b.build()
    }
}

/// A single file's worth of generated bytes, handed out by
/// [`InMemoryFs::open_pack_or_rev`].
pub struct InMemoryFile {
    bytes: Vec<u8>,
}

impl RevisionFile for InMemoryFile {
    fn len(&mut self) -> Result<u64> {
        Ok(self.bytes.len() as u64)
    }

    fn read_at(&mut self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let start = offset as usize;
        let end = start.saturating_add(len as usize);
        self.bytes
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                Error::Corrupt(format!(
                    "read {}..{} past end of {}-byte file",
                    start,
                    end,
                    self.bytes.len()
                ))
            })
    }
}

impl FsBackend for InMemoryFs {
    fn youngest_revision(&self) -> Revnum {
        self.youngest
    }

    fn min_unpacked_revision(&self) -> Revnum {
        self.min_unpacked
    }

    fn shard_size(&self) -> u64 {
        self.shard_size
    }

    fn use_logical_addressing(&self) -> bool {
        self.logical
    }

    fn open_pack_or_rev(&self, rev: Revnum) -> Result<Box<dyn RevisionFile>> {
        let key = self.file_key(rev);
        let bytes = self
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::Corrupt(format!("no file for revision {rev}")))?;
        Ok(Box::new(InMemoryFile { bytes }))
    }

    fn packed_offset(&self, rev: Revnum) -> Result<u64> {
        self.packed_offset
            .get(&rev)
            .copied()
            .ok_or_else(|| Error::Corrupt(format!("no packed offset for revision {rev}")))
    }

    fn read_rep_header(&self, _file: &mut dyn RevisionFile, offset: u64) -> Result<RepHeader> {
        match self.headers.get(&offset) {
            Some(Some(header)) => Ok(*header),
            Some(None) => Err(Error::Corrupt(format!(
                "delta chain for representation at offset {offset} does not resolve"
            ))),
            None => Err(Error::Corrupt(format!("no rep header registered at offset {offset}"))),
        }
    }

    fn read_noderev(
        &self,
        _file: &mut dyn RevisionFile,
        offset: u64,
        revision: Revnum,
    ) -> Result<NodeRev> {
        self.nodes
            .get(&(revision, offset))
            .cloned()
            .ok_or_else(|| Error::Corrupt(format!("no node-revision at r{revision}:{offset}")))
    }

    fn rep_contents_dir(
        &self,
        _file: &mut dyn RevisionFile,
        noderev: &NodeRev,
    ) -> Result<Vec<DirEntry>> {
        let loc = noderev
            .data_rep
            .ok_or_else(|| Error::Corrupt("directory node-revision has no data representation".into()))?;
        Ok(self.dirs.get(&(loc.revision, loc.offset)).cloned().unwrap_or_default())
    }

    fn p2l_max_offset(&self, _file: &mut dyn RevisionFile, revision: Revnum) -> Result<u64> {
        let key = self.file_key(revision);
        Ok(self.files.get(&key).map(|b| b.len() as u64).unwrap_or(0))
    }

    fn p2l_index_lookup(
        &self,
        _file: &mut dyn RevisionFile,
        revision: Revnum,
        offset: u64,
        page_size: u64,
    ) -> Result<Vec<P2lEntry>> {
        let key = self.file_key(revision);
        Ok(self
            .p2l
            .get(&key)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.offset >= offset && e.offset < offset + page_size)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}
