#![allow(missing_docs)]

use revstats::fs::memory::{InMemoryFs, InMemoryRepoBuilder};
use revstats::fs::{NodeKind, NodeRevId, RepLoc};
use revstats::{query, EngineOptions};

#[test]
fn rep_sharing_across_revisions_counts_one_shared_representation() {
    let mut b = InMemoryRepoBuilder::new();
    let r0 = b.add_revision();
    b.set_root(r0, 10);
    let data_loc = RepLoc { revision: r0, offset: 20, size: 40, expanded_size: 40 };
    b.add_rep_header(r0, 20, Some(5));
    b.add_node(
        r0,
        10,
        NodeKind::File,
        "/trunk/a.txt",
        None,
        Some(data_loc),
        None,
        60,
    );

    // r1's file node-revision is unmodified content rep-shared from r0.
    let r1 = b.add_revision();
    b.set_root(r1, 110);
    b.add_node(
        r1,
        110,
        NodeKind::File,
        "/trunk/a.txt",
        Some(NodeRevId { revision: r0, item: 10 }),
        Some(data_loc),
        None,
        60,
    );
    let fs = b.build();

    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");
    assert_eq!(stats.file_rep_pack_stats.count, 1, "one distinct representation");
    assert_eq!(stats.file_rep_stats.shared.count, 1);
    assert_eq!(stats.file_rep_stats.unique.count, 0);
    assert_eq!(stats.file_rep_stats.references, 2);
    assert_eq!(stats.file_rep_stats.expanded_size, 80);
}

#[test]
fn total_rep_pack_count_equals_sum_of_kind_buckets() {
    let fs = InMemoryFs::demo();
    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");

    let summed = stats.file_rep_pack_stats.count
        + stats.dir_rep_pack_stats.count
        + stats.file_prop_rep_pack_stats.count
        + stats.dir_prop_rep_pack_stats.count
        + stats.unused_rep_pack_stats.count;
    assert_eq!(stats.total_rep_pack_stats.count, summed);
}

#[test]
fn largest_changes_is_sorted_descending_and_bounded() {
    let fs = InMemoryFs::demo();
    let options = EngineOptions { largest_changes_capacity: 1, ..EngineOptions::default() };
    let stats = query::get_stats(&fs, options, None, None).expect("stats");

    assert_eq!(stats.largest_changes.changes.len(), 1);
    // r2's hello.txt (size 52) is the larger of the two file changes.
    assert_eq!(stats.largest_changes.changes[0].size, 52);
}

#[test]
fn histograms_bucket_every_first_reference_exactly_once() {
    let fs = InMemoryFs::demo();
    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");

    let total_bucketed: u64 = stats.rep_size_histogram.buckets.iter().map(|b| b.count).sum();
    assert_eq!(total_bucketed, stats.rep_size_histogram.total.count);
    // Demo repo has 4 distinct representations (data+prop for hello.txt's
    // first version, plus each revision's directory listing).
    assert_eq!(stats.rep_size_histogram.total.count, stats.total_rep_pack_stats.count);
}

#[test]
fn extension_histogram_only_tracks_file_representations() {
    let fs = InMemoryFs::demo();
    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");

    assert!(stats.by_extension.contains_key("txt"));
    assert!(!stats.by_extension.contains_key("(none)"));
}
