//! Integration tests for the `unipoll` binary.
//!
//! Argument parsing, config errors and exit codes, all without a live
//! UniFi controller.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `unipoll` binary with env isolation.
///
/// Clears `UNIPOLL_*` variables and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn unipoll_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("unipoll");
    cmd.env("HOME", "/tmp/unipoll-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/unipoll-cli-test-nonexistent")
        .env_remove("UNIPOLL_CONFIG")
        .env_remove("UNIPOLL_PROFILE")
        .env_remove("UNIPOLL_INSECURE")
        .env_remove("UNIPOLL_LOG_FORMAT")
        .env_remove("UNIPOLL_USERNAME")
        .env_remove("UNIPOLL_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    unipoll_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Prometheus")
            .and(predicate::str::contains("serve"))
            .and(predicate::str::contains("snapshot")),
    );
}

#[test]
fn test_version_flag() {
    unipoll_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unipoll"));
}

#[test]
fn test_serve_help_lists_overrides() {
    unipoll_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--listen")
                .and(predicate::str::contains("--cache-ttl"))
                .and(predicate::str::contains("--refresh-timeout")),
        );
}

// ── Usage errors ────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    unipoll_cmd()
        .arg("foobar")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("foobar"));
}

#[test]
fn test_bad_duration_is_a_usage_error() {
    unipoll_cmd()
        .args(["serve", "--cache-ttl", "soonish"])
        .assert()
        .code(2);
}

// ── Config errors ───────────────────────────────────────────────────

#[test]
fn test_missing_explicit_config() {
    unipoll_cmd()
        .args(["snapshot", "--config", "/tmp/unipoll-cli-test-nonexistent/nope.toml"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_no_profiles_configured() {
    let file = config_file("[exporter]\ncache_ttl = 30\n");
    unipoll_cmd()
        .args(["snapshot", "--config"])
        .arg(file.path())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No controller profiles"));
}

#[test]
fn test_unknown_profile_lists_available() {
    let file = config_file(
        r#"
[profiles.home]
controller = "https://192.168.1.1"
username = "exporter"
password = "secret"
"#,
    );
    unipoll_cmd()
        .args(["snapshot", "--profile", "office", "--config"])
        .arg(file.path())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("office").and(predicate::str::contains("home")));
}

#[test]
fn test_missing_username_is_an_auth_error() {
    let file = config_file(
        r#"
[profiles.home]
controller = "https://192.168.1.1"
"#,
    );
    unipoll_cmd()
        .args(["snapshot", "--config"])
        .arg(file.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No credentials"));
}

#[test]
fn test_zero_refresh_timeout_is_rejected() {
    let file = config_file(
        r#"
[exporter]
refresh_timeout = 0

[profiles.home]
controller = "https://192.168.1.1"
username = "exporter"
"#,
    );
    unipoll_cmd()
        .args(["serve", "--config"])
        .arg(file.path())
        .env("UNIPOLL_PASSWORD", "secret")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exporter.refresh_timeout"));
}

// ── Controller errors ───────────────────────────────────────────────

#[test]
fn test_unreachable_controller() {
    let file = config_file(
        r#"
[profiles.home]
controller = "http://127.0.0.1:1"
username = "exporter"
platform = "classic"
timeout = 5
"#,
    );
    unipoll_cmd()
        .args(["snapshot", "--config"])
        .arg(file.path())
        .env("UNIPOLL_PASSWORD", "secret")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not connect"));
}
