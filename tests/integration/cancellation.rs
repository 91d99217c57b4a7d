#![allow(missing_docs)]

use revstats::fs::memory::InMemoryRepoBuilder;
use revstats::fs::NodeKind;
use revstats::{query, EngineOptions, Error};

fn repo_with_revisions(n: u64) -> revstats::fs::memory::InMemoryFs {
    let mut b = InMemoryRepoBuilder::new();
    for _ in 0..n {
        let r = b.add_revision();
        b.set_root(r, 10);
        b.add_node(r, 10, NodeKind::Directory, "/", None, None, None, 20);
    }
    b.build()
}

#[test]
fn cancel_aborts_the_whole_traversal_with_no_partial_stats() {
    let fs = repo_with_revisions(5);
    let mut calls = 0u32;
    let mut cancel = || -> bool {
        calls += 1;
        calls >= 2
    };

    let result = query::get_stats(&fs, EngineOptions::default(), None, Some(&mut cancel));
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn cancel_that_never_fires_lets_the_traversal_complete() {
    let fs = repo_with_revisions(5);
    let mut cancel = || -> bool { false };

    let stats = query::get_stats(&fs, EngineOptions::default(), None, Some(&mut cancel))
        .expect("traversal should complete");
    assert_eq!(stats.revision_count, 5);
}

#[test]
fn progress_callback_error_aborts_the_traversal() {
    let mut b = InMemoryRepoBuilder::new().shard_size(1).min_unpacked_revision(2);
    for _ in 0..2 {
        let r = b.add_revision();
        b.set_root(r, 10);
        b.add_node(r, 10, NodeKind::Directory, "/", None, None, None, 20);
    }
    let fs = b.build();

    let mut progress = |_rev: revstats::fs::Revnum| -> revstats::Result<()> {
        Err(Error::Corrupt("operator requested stop".into()))
    };

    let result = query::get_stats(&fs, EngineOptions::default(), Some(&mut progress), None);
    assert!(matches!(result, Err(Error::Corrupt(_))));
}

#[test]
fn empty_logical_shard_still_checks_cancel_once() {
    let mut b = InMemoryRepoBuilder::new().logical_addressing(true);
    b.add_revision();
    let fs = b.build();

    let mut calls = 0u32;
    let mut cancel = || -> bool {
        calls += 1;
        false
    };
    query::get_stats(&fs, EngineOptions::default(), None, Some(&mut cancel)).expect("stats");
    assert!(calls >= 1, "cancel must be polled even for an empty index");
}
