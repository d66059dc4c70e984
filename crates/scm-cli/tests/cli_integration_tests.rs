//! End-to-end tests driving the compiled `scm-cli` binary.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn list_nodes_with_seed_prints_seeded_hosts() {
    let mut cmd = Command::cargo_bin("scm-cli").unwrap();
    cmd.args(["--seed", "2", "list-nodes"]);
    cmd.assert().success().stdout(contains("dn-0"));
}

#[test]
fn stats_with_no_seed_reports_zero_capacity() {
    let mut cmd = Command::cargo_bin("scm-cli").unwrap();
    cmd.arg("stats");
    cmd.assert().success().stdout(contains("\"capacity\": 0"));
}

#[test]
fn show_node_for_unknown_uuid_fails() {
    let mut cmd = Command::cargo_bin("scm-cli").unwrap();
    cmd.args(["show-node", "00000000-0000-0000-0000-000000000000"]);
    cmd.assert().failure();
}

#[test]
fn missing_subcommand_fails() {
    let mut cmd = Command::cargo_bin("scm-cli").unwrap();
    cmd.assert().failure();
}
