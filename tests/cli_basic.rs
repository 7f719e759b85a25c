//! Integration tests for basic CLI behavior.
//!
//! Covers flags, per-subcommand help, argument validation, and the
//! commands that run without network access.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `anilink` binary.
fn anilink() -> Command {
    Command::cargo_bin("anilink").expect("binary 'anilink' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    anilink()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: anilink"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("episodes"))
        .stdout(predicate::str::contains("rankings"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn version_flag_shows_semver() {
    anilink()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^anilink \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    anilink()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: anilink"));
}

#[test]
fn invalid_subcommand_fails() {
    anilink()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn resolve_help() {
    anilink()
        .args(["resolve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve one episode"))
        .stdout(predicate::str::contains("<SHOW_ID>"))
        .stdout(predicate::str::contains("<EPISODE>"))
        .stdout(predicate::str::contains("--dub"))
        .stdout(predicate::str::contains("--quality"))
        .stdout(predicate::str::contains("--mp4-only"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn search_help() {
    anilink()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Search shows"))
        .stdout(predicate::str::contains("<QUERY>"))
        .stdout(predicate::str::contains("--limit"));
}

#[test]
fn episodes_help() {
    anilink()
        .args(["episodes", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<SHOW_ID>"))
        .stdout(predicate::str::contains("--dub"));
}

#[test]
fn rankings_help() {
    anilink()
        .args(["rankings", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("success rates"));
}

// ─── Argument validation ─────────────────────────────────────────────────────

#[test]
fn resolve_missing_episode_fails() {
    anilink()
        .args(["resolve", "show1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<EPISODE>"));
}

#[test]
fn search_non_numeric_limit_fails() {
    anilink()
        .args(["search", "frieren", "--limit", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn invalid_config_is_reported_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "max_workers = 0\n").unwrap();

    anilink()
        .arg("--config")
        .arg(&path)
        .args(["resolve", "show1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_workers"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "workers = 2\n").unwrap();

    anilink()
        .arg("--config")
        .arg(&path)
        .arg("rankings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

// ─── Rankings (reads local stats only) ───────────────────────────────────────

#[cfg(target_os = "linux")]
#[test]
fn rankings_reads_stats_file() {
    let data = tempfile::tempdir().unwrap();
    let stats_dir = data.path().join("anilink");
    std::fs::create_dir_all(&stats_dir).unwrap();
    std::fs::write(
        stats_dir.join("provider_stats.json"),
        r#"{"providers":{
            "Wixmp":{"success_count":3,"failure_count":1,"avg_latency_ms":400.0,"last_used":null},
            "HiAnime":{"success_count":2,"failure_count":0,"avg_latency_ms":900.0,"last_used":null}
        }}"#,
    )
    .unwrap();

    anilink()
        .env("XDG_DATA_HOME", data.path())
        .env("XDG_CONFIG_HOME", data.path())
        .args(["rankings", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r#"(?s)"provider": "HiAnime".*"provider": "Wixmp""#).unwrap())
        .stdout(predicate::str::contains("75.0"));
}

#[cfg(target_os = "linux")]
#[test]
fn rankings_without_stats_is_empty() {
    let data = tempfile::tempdir().unwrap();

    anilink()
        .env("XDG_DATA_HOME", data.path())
        .env("XDG_CONFIG_HOME", data.path())
        .arg("rankings")
        .assert()
        .success()
        .stderr(predicate::str::contains("No provider stats yet"));
}
