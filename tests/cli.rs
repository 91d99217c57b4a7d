#![allow(missing_docs)]

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn demo_stats_prints_a_text_report() {
    Command::cargo_bin("revstats-cli")
        .unwrap()
        .args(["stats", "--demo"])
        .assert()
        .success()
        .stdout(contains("Revisions"))
        .stdout(contains("revision_count"));
}

#[test]
fn demo_stats_json_is_well_formed() {
    let output = Command::cargo_bin("revstats-cli")
        .unwrap()
        .args(["--format", "json", "stats", "--demo"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["revision_count"], 3);
}

#[test]
fn without_demo_flag_refuses_to_run() {
    Command::cargo_bin("revstats-cli")
        .unwrap()
        .args(["stats"])
        .assert()
        .failure()
        .stderr(contains("--demo"));
}
