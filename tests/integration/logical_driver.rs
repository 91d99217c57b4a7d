#![allow(missing_docs)]

use revstats::fs::memory::InMemoryRepoBuilder;
use revstats::fs::NodeKind;
use revstats::{query, EngineOptions};

#[test]
fn walks_a_single_logical_revision() {
    let mut b = InMemoryRepoBuilder::new().logical_addressing(true);
    let r0 = b.add_revision();
    b.set_root(r0, 10);
    b.add_node(r0, 10, NodeKind::Directory, "/", None, None, None, 20);
    b.add_change(r0, "/trunk/a.txt");
    let fs = b.build();

    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");
    assert_eq!(stats.revision_count, 1);
    assert_eq!(stats.dir_noderev_count, 1);
    assert_eq!(stats.change_count, 1);
}

#[test]
fn logical_mode_still_charges_constant_header_overhead() {
    let mut b = InMemoryRepoBuilder::new().logical_addressing(true);
    let r0 = b.add_revision();
    b.set_root(r0, 10);
    let data_loc = revstats::fs::RepLoc {
        revision: r0,
        offset: 40,
        size: 12,
        expanded_size: 12,
    };
    b.add_node(
        r0,
        10,
        NodeKind::File,
        "/trunk/a.txt",
        None,
        Some(data_loc),
        None,
        30,
    );
    let fs = b.build();

    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");
    // Logical mode never reads a REP_HEADER, so header_size is always 0,
    // but the "ENDREP\n" trailer overhead (header_size + 7) is still
    // charged per representation.
    assert_eq!(stats.total_rep_pack_stats.header_overhead, 7);
    assert_eq!(stats.file_rep_stats.unique.count, 1);
}

#[test]
fn walks_every_revision_across_multiple_logical_pages() {
    let mut b = InMemoryRepoBuilder::new().logical_addressing(true);
    let r0 = b.add_revision();
    b.set_root(r0, 10);
    b.add_node(r0, 10, NodeKind::Directory, "/", None, None, None, 20);
    // Force more than one page_size-sized step through the index.
    for i in 0..20u64 {
        b.add_node(
            r0,
            1_000 + i,
            NodeKind::File,
            &format!("/trunk/f{i}.txt"),
            None,
            None,
            None,
            10,
        );
    }
    let fs = b.build();

    let options = EngineOptions { page_size: 64, ..EngineOptions::default() };
    let stats = query::get_stats(&fs, options, None, None).expect("stats");
    assert_eq!(stats.file_noderev_count, 20);
}

#[test]
fn empty_revision_with_no_index_blocks_still_counts() {
    // A revision whose p2l index covers zero blocks (nothing but its
    // changes record) must still be walked without special-casing.
    let mut b = InMemoryRepoBuilder::new().logical_addressing(true);
    let r0 = b.add_revision();
    b.set_root(r0, 0);
    let fs = b.build();

    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");
    assert_eq!(stats.revision_count, 1);
    assert_eq!(stats.dir_noderev_count, 0);
    assert_eq!(stats.file_noderev_count, 0);
}
