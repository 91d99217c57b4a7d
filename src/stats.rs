//! The `Stats` result type and the aggregation pass that fills in its
//! representation-derived fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fs::Revnum;
use crate::model::histogram::Histogram;
use crate::model::largest_changes::LargestChanges;
use crate::model::rep::RepKind;
use crate::model::revision::RevisionInfo;

/// Simple per-kind accounting of a representation's on-disk footprint,
/// regardless of how many node-revisions reference it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepPackStats {
    /// Number of distinct representations.
    pub count: u64,
    /// Sum of on-disk (possibly delta-encoded) sizes.
    pub packed_size: u64,
    /// Sum of reconstructed (expanded) sizes.
    pub expanded_size: u64,
    /// Sum of `header_size + 7` (the `"ENDREP\n"` trailer) across every
    /// representation. In logical-addressing mode `header_size` is always
    /// `0` (the index gives exact extents, so the header is never read),
    /// so each such representation still contributes the constant `7`.
    pub header_overhead: u64,
}

impl RepPackStats {
    fn add(&mut self, packed_size: u64, expanded_size: u64, header_overhead: u64) {
        self.count += 1;
        self.packed_size += packed_size;
        self.expanded_size += expanded_size;
        self.header_overhead += header_overhead;
    }
}

/// Combined representation statistics, split by sharing and carrying the
/// logical (pre-dedup) footprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepStats {
    /// Representations referenced exactly once.
    pub unique: RepPackStats,
    /// Representations referenced more than once (rep-sharing).
    pub shared: RepPackStats,
    /// Sum of `ref_count` across all representations in this bucket.
    pub references: u64,
    /// Sum of `ref_count * expanded_size`: the uncompressed footprint the
    /// repository would occupy without rep-sharing deduplication.
    pub expanded_size: u64,
}

/// Per-extension histogram pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionHistograms {
    /// On-disk size histogram for files with this extension.
    pub rep_size: Histogram,
    /// Expanded-size histogram for files with this extension.
    pub expanded_size: Histogram,
}

/// Sentinel extension key for files with no extension (and for names that
/// are entirely an extension, e.g. `.gitignore`).
pub const NO_EXTENSION: &str = "(none)";

/// The full result of a statistics pass over a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    /// Number of revisions read.
    pub revision_count: u64,
    /// Total changed-path records across all revisions.
    pub change_count: u64,
    /// Total byte length of changed-paths sections across all revisions.
    pub change_len: u64,
    /// Total byte size of the repository's rev/pack data read.
    pub total_size: u64,
    /// Total directory node-revisions parsed.
    pub dir_noderev_count: u64,
    /// Total file node-revisions parsed.
    pub file_noderev_count: u64,
    /// Total byte length of directory node-revision records.
    pub dir_noderev_size: u64,
    /// Total byte length of file node-revision records.
    pub file_noderev_size: u64,

    /// Pack-footprint accounting across every representation, of any
    /// kind — satisfies `total == file + dir + file_prop + dir_prop +
    /// unused`.
    pub total_rep_pack_stats: RepPackStats,
    /// Pack-footprint accounting for file-content representations.
    pub file_rep_pack_stats: RepPackStats,
    /// Pack-footprint accounting for directory-listing representations.
    pub dir_rep_pack_stats: RepPackStats,
    /// Pack-footprint accounting for file-property representations.
    pub file_prop_rep_pack_stats: RepPackStats,
    /// Pack-footprint accounting for directory-property representations.
    pub dir_prop_rep_pack_stats: RepPackStats,
    /// Pack-footprint accounting for representations that were never
    /// reached via a node-revision.
    pub unused_rep_pack_stats: RepPackStats,

    /// Combined (unique/shared/references/logical) stats over every
    /// reachable representation.
    pub total_rep_stats: RepStats,
    /// Combined stats for file-content representations.
    pub file_rep_stats: RepStats,
    /// Combined stats for directory-listing representations.
    pub dir_rep_stats: RepStats,
    /// Combined stats for file-property representations.
    pub file_prop_rep_stats: RepStats,
    /// Combined stats for directory-property representations.
    pub dir_prop_rep_stats: RepStats,

    /// Histogram of on-disk sizes for every first-referenced
    /// representation.
    pub rep_size_histogram: Histogram,
    /// Histogram of expanded sizes for every first-referenced
    /// representation.
    pub expanded_rep_size_histogram: Histogram,
    /// Histogram of on-disk sizes, restricted to representations
    /// introduced by a node-revision with no predecessor.
    pub added_rep_size_histogram: Histogram,
    /// Histogram of expanded sizes, restricted to representations
    /// introduced by a node-revision with no predecessor.
    pub added_expanded_rep_size_histogram: Histogram,

    /// The largest individual changes seen, descending by size.
    pub largest_changes: LargestChanges,
    /// Per-file-extension size histograms (`"(none)"` for extensionless
    /// names).
    pub by_extension: BTreeMap<String, ExtensionHistograms>,
}

impl Stats {
    /// Creates an empty result, with `largest_changes` bounded to
    /// `largest_changes_capacity` entries.
    pub fn new(largest_changes_capacity: usize) -> Self {
        Stats {
            revision_count: 0,
            change_count: 0,
            change_len: 0,
            total_size: 0,
            dir_noderev_count: 0,
            file_noderev_count: 0,
            dir_noderev_size: 0,
            file_noderev_size: 0,
            total_rep_pack_stats: RepPackStats::default(),
            file_rep_pack_stats: RepPackStats::default(),
            dir_rep_pack_stats: RepPackStats::default(),
            file_prop_rep_pack_stats: RepPackStats::default(),
            dir_prop_rep_pack_stats: RepPackStats::default(),
            unused_rep_pack_stats: RepPackStats::default(),
            total_rep_stats: RepStats::default(),
            file_rep_stats: RepStats::default(),
            dir_rep_stats: RepStats::default(),
            file_prop_rep_stats: RepStats::default(),
            dir_prop_rep_stats: RepStats::default(),
            rep_size_histogram: Histogram::new(),
            expanded_rep_size_histogram: Histogram::new(),
            added_rep_size_histogram: Histogram::new(),
            added_expanded_rep_size_histogram: Histogram::new(),
            largest_changes: LargestChanges::new(largest_changes_capacity),
            by_extension: BTreeMap::new(),
        }
    }

    /// Records one first-reference of a representation, per `spec.md`
    /// §4.3's `add_change`. Called exactly once per representation, at
    /// the moment its `ref_count` transitions `0 -> 1`.
    pub fn add_change(
        &mut self,
        rep_size: u64,
        expanded_size: u64,
        revision: Revnum,
        path: &str,
        kind: RepKind,
        plain_added: bool,
    ) {
        self.rep_size_histogram.add(rep_size);
        self.expanded_rep_size_histogram.add(expanded_size);
        if plain_added {
            self.added_rep_size_histogram.add(rep_size);
            self.added_expanded_rep_size_histogram.add(expanded_size);
        }
        self.largest_changes.insert(rep_size, revision, path);
        if kind == RepKind::File {
            let entry = self
                .by_extension
                .entry(extension_of(path))
                .or_insert_with(ExtensionHistograms::default);
            entry.rep_size.add(rep_size);
            entry.expanded_size.add(expanded_size);
        }
    }

    /// Collapses the per-revision accumulators in `revisions` into this
    /// result's scalar totals and representation buckets. Called exactly
    /// once, after every revision has been read.
    pub fn aggregate(&mut self, revisions: &[RevisionInfo]) {
        self.revision_count = revisions.len() as u64;
        for revision in revisions {
            self.change_count += revision.change_count;
            self.change_len += revision.changes_len;
            self.total_size += revision.end.saturating_sub(revision.offset);
            self.dir_noderev_count += revision.dir_noderev_count;
            self.file_noderev_count += revision.file_noderev_count;
            self.dir_noderev_size += revision.dir_noderev_size;
            self.file_noderev_size += revision.file_noderev_size;

            for rep in &revision.representations {
                let header_overhead = u64::from(rep.header_size) + 7;
                self.total_rep_pack_stats
                    .add(rep.size, rep.expanded_size, header_overhead);
                let pack_bucket = match rep.kind {
                    RepKind::File => &mut self.file_rep_pack_stats,
                    RepKind::Directory => &mut self.dir_rep_pack_stats,
                    RepKind::FileProperty => &mut self.file_prop_rep_pack_stats,
                    RepKind::DirProperty => &mut self.dir_prop_rep_pack_stats,
                    RepKind::Unused => &mut self.unused_rep_pack_stats,
                };
                pack_bucket.add(rep.size, rep.expanded_size, header_overhead);

                if rep.ref_count == 0 {
                    continue;
                }
                let detail_bucket = match rep.kind {
                    RepKind::File => &mut self.file_rep_stats,
                    RepKind::Directory => &mut self.dir_rep_stats,
                    RepKind::FileProperty => &mut self.file_prop_rep_stats,
                    RepKind::DirProperty => &mut self.dir_prop_rep_stats,
                    RepKind::Unused => continue,
                };
                add_detail(detail_bucket, rep.size, rep.expanded_size, header_overhead, rep.ref_count);
                add_detail(
                    &mut self.total_rep_stats,
                    rep.size,
                    rep.expanded_size,
                    header_overhead,
                    rep.ref_count,
                );
            }
        }
    }
}

fn add_detail(
    bucket: &mut RepStats,
    packed_size: u64,
    expanded_size: u64,
    header_overhead: u64,
    ref_count: u32,
) {
    if ref_count == 1 {
        bucket.unique.add(packed_size, expanded_size, header_overhead);
    } else {
        bucket.shared.add(packed_size, expanded_size, header_overhead);
    }
    bucket.references += u64::from(ref_count);
    bucket.expanded_size += u64::from(ref_count) * expanded_size;
}

/// Extracts the extension component used to key [`Stats::by_extension`]:
/// the verbatim substring after the last `.` in the path's final
/// component (no case folding — `README.TXT` and `x.txt` key separately),
/// or [`NO_EXTENSION`] if there is no `.` (or the `.` is the name's first
/// character, as in `.gitignore`).
fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => NO_EXTENSION.to_string(),
        Some(idx) => name[idx + 1..].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_extraction() {
        assert_eq!(extension_of("/trunk/README.TXT"), "TXT");
        assert_eq!(extension_of("/trunk/Makefile"), NO_EXTENSION);
        assert_eq!(extension_of("/trunk/.gitignore"), NO_EXTENSION);
        assert_eq!(extension_of("/a.b/c.rs"), "rs");
    }

    #[test]
    fn extension_bucketing_is_case_sensitive() {
        assert_ne!(extension_of("/trunk/a.TXT"), extension_of("/trunk/b.txt"));
    }

    #[test]
    fn aggregate_identity_holds() {
        let mut revisions = vec![RevisionInfo::new(0)];
        revisions[0].end = 100;
        let loc = crate::fs::RepLoc {
            revision: 0,
            offset: 10,
            size: 5,
            expanded_size: 5,
        };
        let r = crate::model::rep::intern(&mut revisions, loc);
        {
            let rep = &mut revisions[r.rev_idx].representations[r.rep_idx];
            rep.kind = RepKind::File;
            rep.ref_count = 2;
        }
        let mut stats = Stats::new(8);
        stats.aggregate(&revisions);
        let summed = stats.file_rep_pack_stats.count
            + stats.dir_rep_pack_stats.count
            + stats.file_prop_rep_pack_stats.count
            + stats.dir_prop_rep_pack_stats.count
            + stats.unused_rep_pack_stats.count;
        assert_eq!(stats.total_rep_pack_stats.count, summed);
        assert_eq!(stats.file_rep_stats.shared.count, 1);
        assert_eq!(stats.file_rep_stats.references, 2);
        assert_eq!(stats.file_rep_stats.expanded_size, 10);
    }
}
