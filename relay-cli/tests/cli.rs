//! Binary-level checks for relay-cli.

use assert_cmd::Command;
use predicates::prelude::*;

fn relay_cli() -> Command {
    let mut cmd = Command::cargo_bin("relay-cli").unwrap();
    cmd.env_remove("RELAY_URL");
    cmd
}

#[test]
fn help_lists_commands() {
    relay_cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn fetch_against_unreachable_relay_fails() {
    relay_cli()
        .args(["--url", "http://127.0.0.1:1", "fetch", "4231"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch code 4231"));
}

#[test]
fn submit_reads_url_from_env() {
    relay_cli()
        .env("RELAY_URL", "http://127.0.0.1:1")
        .args(["submit", "QUJD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://127.0.0.1:1/"));
}

#[test]
fn missing_subcommand_is_usage_error() {
    relay_cli().assert().failure();
}
