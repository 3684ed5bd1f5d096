// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the repowatch CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Run repowatch with an isolated data and config location
fn repowatch(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("repowatch").expect("binary should build");
    cmd.env("REPOWATCH_DATA_DIR", data_dir.path())
        .env("REPOWATCH_CONFIG", data_dir.path().join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    fs::write(data_dir.path().join("config.toml"), "").unwrap();
    cmd
}

#[test]
fn test_roots_lifecycle() {
    let data_dir = TempDir::new().unwrap();
    let scan_dir = TempDir::new().unwrap();
    let root = scan_dir.path().display().to_string();

    repowatch(&data_dir)
        .args(["roots", "add", &root])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added"));

    // second add of the same path is rejected
    repowatch(&data_dir)
        .args(["roots", "add", &format!("{root}/")])
        .assert()
        .success()
        .stdout(predicate::str::contains("already configured"));

    let prefs = fs::read_to_string(data_dir.path().join("preferences.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&prefs).unwrap();
    let roots = saved["scan_roots"].as_array().unwrap();
    assert!(roots.iter().filter(|r| r.as_str() == Some(root.as_str())).count() == 1);

    repowatch(&data_dir)
        .args(["roots", "remove", "/definitely/not/configured"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));

    repowatch(&data_dir)
        .args(["roots", "remove", &root])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
}

#[test]
fn test_filter_persists() {
    let data_dir = TempDir::new().unwrap();

    repowatch(&data_dir)
        .arg("filter")
        .assert()
        .success()
        .stdout("dirty\n");

    repowatch(&data_dir)
        .args(["filter", "toggle"])
        .assert()
        .success()
        .stdout("all\n");

    repowatch(&data_dir)
        .arg("filter")
        .assert()
        .success()
        .stdout("all\n");
}

#[test]
fn test_scan_of_missing_root_is_empty() {
    let data_dir = TempDir::new().unwrap();
    let missing = data_dir.path().join("nowhere");

    repowatch(&data_dir)
        .args(["--json", "scan", "--all", "--root"])
        .arg(&missing)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_config_shows_defaults() {
    let data_dir = TempDir::new().unwrap();

    repowatch(&data_dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("refresh_interval_secs = 120"))
        .stdout(predicate::str::contains("max_depth = 4"));
}

#[test]
fn test_completions() {
    let data_dir = TempDir::new().unwrap();

    repowatch(&data_dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repowatch"));
}

#[test]
fn test_no_color_accepts_any_value() {
    let data_dir = TempDir::new().unwrap();

    for value in ["1", "true", "yes", ""] {
        repowatch(&data_dir)
            .env("NO_COLOR", value)
            .arg("filter")
            .assert()
            .success()
            .stdout("dirty\n");
    }

    repowatch(&data_dir)
        .args(["--no-color", "filter"])
        .assert()
        .success();
}
