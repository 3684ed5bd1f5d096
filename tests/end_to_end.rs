// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! End-to-end scans against real git repositories
//!
//! Every test skips itself when no `git` binary is available.

use repowatch::coordinator::ScanCoordinator;
use repowatch::config::ScanSettings;
use repowatch::inspector::RepositoryInspector;
use repowatch::scheduler::{ScanScheduler, ROOTS_KEY};
use repowatch::store::{KeyValueStoreExt, MemoryStore};
use repowatch::types::{RepositoryStatus, ScanOutcome};
use repowatch::vcs::GitCli;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking on failure
fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("Failed to execute git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Initialise a repository with one committed file
fn init_repo(path: &Path) {
    fs::create_dir_all(path).unwrap();
    git(path, &["init", "-q", "-b", "main"]);
    fs::write(path.join("README"), "hello\n").unwrap();
    git(path, &["add", "README"]);
    git(path, &["commit", "-q", "-m", "Initial commit"]);
}

fn coordinator() -> ScanCoordinator {
    ScanCoordinator::from_settings(&ScanSettings::default())
}

#[tokio::test]
async fn test_dirty_repository_sorts_first() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let root = TempDir::new().unwrap();
    let clean = root.path().join("clean");
    let dirty = root.path().join("dirty");
    init_repo(&clean);
    init_repo(&dirty);

    // two staged, one unstaged
    fs::write(dirty.join("a.txt"), "a\n").unwrap();
    fs::write(dirty.join("b.txt"), "b\n").unwrap();
    git(&dirty, &["add", "a.txt", "b.txt"]);
    fs::write(dirty.join("README"), "changed\n").unwrap();

    let repos = coordinator().run_scan(&[root.path().to_path_buf()]).await;

    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0].name, "dirty");
    assert_eq!(repos[0].status, RepositoryStatus::from_counts(2, 1, 0));
    assert_eq!(repos[0].status.total_changes(), 3);
    assert_eq!(repos[0].branch, "main");
    assert_eq!(repos[0].last_commit_message, "Initial commit");
    assert!(repos[0].last_commit_at.is_some());

    assert_eq!(repos[1].name, "clean");
    assert_eq!(repos[1].status, RepositoryStatus::Clean);
}

#[tokio::test]
async fn test_untracked_and_index_plus_worktree() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let root = TempDir::new().unwrap();
    let repo = root.path().join("work");
    init_repo(&repo);

    fs::write(repo.join("README"), "staged\n").unwrap();
    git(&repo, &["add", "README"]);
    fs::write(repo.join("README"), "staged then edited\n").unwrap();
    fs::write(repo.join("new.txt"), "new\n").unwrap();

    let inspector = RepositoryInspector::new(Arc::new(GitCli::default()));
    let inspected = inspector.inspect(&repo).await.unwrap();

    assert_eq!(inspected.status, RepositoryStatus::from_counts(1, 1, 1));
}

#[tokio::test]
async fn test_repository_without_commits() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let root = TempDir::new().unwrap();
    let repo = root.path().join("fresh");
    fs::create_dir_all(&repo).unwrap();
    git(&repo, &["init", "-q", "-b", "trunk"]);

    let inspector = RepositoryInspector::new(Arc::new(GitCli::default()));
    let inspected = inspector.inspect(&repo).await.unwrap();

    assert_eq!(inspected.branch, "trunk");
    assert_eq!(inspected.last_commit_at, None);
    assert_eq!(inspected.last_commit_message, "");
}

#[tokio::test]
async fn test_plain_directory_is_rejected() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let root = TempDir::new().unwrap();
    // an empty `.git` directory is not a usable repository
    fs::create_dir_all(root.path().join("fake/.git")).unwrap();

    let repos = coordinator().run_scan(&[root.path().to_path_buf()]).await;
    assert!(repos.is_empty());
}

#[tokio::test]
async fn test_missing_root_yields_empty_scan() {
    let root = TempDir::new().unwrap();
    let repos = coordinator()
        .run_scan(&[root.path().join("does-not-exist")])
        .await;
    assert!(repos.is_empty());
}

#[tokio::test]
async fn test_scheduler_scan_over_persisted_roots() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let root = TempDir::new().unwrap();
    init_repo(&root.path().join("one"));
    init_repo(&root.path().join("nested/two"));
    fs::write(root.path().join("one/untracked.txt"), "x\n").unwrap();

    let store = Arc::new(MemoryStore::new());
    store
        .save(ROOTS_KEY, &vec![root.path().display().to_string()])
        .unwrap();

    let scheduler = ScanScheduler::new(coordinator(), store, Duration::from_secs(3600));
    assert_eq!(
        scheduler.scan().await,
        ScanOutcome::Completed { repositories: 2 }
    );

    assert_eq!(scheduler.dirty_count(), 1);
    let visible = scheduler.filtered_repositories();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "one");

    scheduler.set_show_all(true).unwrap();
    assert_eq!(scheduler.filtered_repositories().len(), 2);
}
