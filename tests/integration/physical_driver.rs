#![allow(missing_docs)]

use revstats::fs::memory::InMemoryRepoBuilder;
use revstats::fs::NodeKind;
use revstats::{query, EngineOptions};

#[test]
fn walks_demo_repository_and_counts_noderevs() {
    let fs = revstats::fs::memory::InMemoryFs::demo();
    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");

    assert_eq!(stats.revision_count, 3);
    // r0: one root dir. r1: dir + file. r2: dir + file.
    assert_eq!(stats.dir_noderev_count, 3);
    assert_eq!(stats.file_noderev_count, 2);
}

#[test]
fn unresolved_rep_header_leaves_representation_unused() {
    let mut b = InMemoryRepoBuilder::new();
    let r0 = b.add_revision();
    b.set_root(r0, 10);
    let data_loc = revstats::fs::RepLoc {
        revision: r0,
        offset: 20,
        size: 30,
        expanded_size: 30,
    };
    // No header registered for offset 20: read_rep_header will fail.
    b.add_node(
        r0,
        10,
        NodeKind::File,
        "/trunk/broken.bin",
        None,
        Some(data_loc),
        None,
        50,
    );
    let fs = b.build();

    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");
    assert_eq!(stats.unused_rep_pack_stats.count, 1);
    assert_eq!(stats.total_rep_stats.unique.count, 0);
    assert_eq!(stats.total_rep_stats.shared.count, 0);
}

#[test]
fn packed_shard_reads_every_revision_in_the_shard() {
    let mut b = InMemoryRepoBuilder::new().shard_size(2).min_unpacked_revision(2);
    for rev in 0..2u64 {
        let r = b.add_revision();
        assert_eq!(r, rev);
        b.set_root(r, 10);
        b.add_node(r, 10, NodeKind::Directory, "/", None, None, None, 20);
        b.add_change(r, "/trunk");
    }
    let fs = b.build();

    let stats = query::get_stats(&fs, EngineOptions::default(), None, None).expect("stats");
    assert_eq!(stats.revision_count, 2);
    assert_eq!(stats.change_count, 2);
}

#[test]
fn progress_callback_fires_once_per_completed_shard() {
    let mut b = InMemoryRepoBuilder::new().shard_size(2).min_unpacked_revision(4);
    for _ in 0..4 {
        let r = b.add_revision();
        b.set_root(r, 10);
        b.add_node(r, 10, NodeKind::Directory, "/", None, None, None, 20);
    }
    let fs = b.build();

    let mut seen = Vec::new();
    let mut progress = |rev: revstats::fs::Revnum| -> revstats::Result<()> {
        seen.push(rev);
        Ok(())
    };
    query::get_stats(&fs, EngineOptions::default(), Some(&mut progress), None).expect("stats");

    assert_eq!(seen, vec![0, 2]);
}
