// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repowatch library - live working-tree status for every repository you own
//!
//! This crate discovers git repositories under a set of root directories,
//! inspects each one's branch, change counts and last commit, and keeps that
//! view fresh on a timer.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod display;
pub mod inspector;
pub mod scheduler;
pub mod status;
pub mod store;
pub mod vcs;

/// Core data types shared by the scanner and its presenters
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use std::cmp::{Ordering, Reverse};
    use std::path::{Path, PathBuf};

    // =========================================================================
    // Repository Status
    // =========================================================================

    /// Working-tree state of a repository
    ///
    /// `Dirty` is never built with all three counts at zero; use
    /// [`RepositoryStatus::from_counts`] and that state comes out as `Clean`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(tag = "state", rename_all = "lowercase")]
    pub enum RepositoryStatus {
        /// Uncommitted changes of some kind
        Dirty {
            /// Paths with an index change
            staged: u32,
            /// Paths with a worktree change not yet in the index
            unstaged: u32,
            /// Paths unknown to git
            untracked: u32,
        },
        /// Nothing to commit
        Clean,
    }

    impl RepositoryStatus {
        /// Build a status from aggregated change counts
        #[must_use]
        pub fn from_counts(staged: u32, unstaged: u32, untracked: u32) -> Self {
            if staged == 0 && unstaged == 0 && untracked == 0 {
                Self::Clean
            } else {
                Self::Dirty {
                    staged,
                    unstaged,
                    untracked,
                }
            }
        }

        /// Whether there is anything uncommitted
        #[must_use]
        pub fn is_dirty(&self) -> bool {
            matches!(self, Self::Dirty { .. })
        }

        /// Staged path count (0 when clean)
        #[must_use]
        pub fn staged(&self) -> u32 {
            match self {
                Self::Dirty { staged, .. } => *staged,
                Self::Clean => 0,
            }
        }

        /// Unstaged path count (0 when clean)
        #[must_use]
        pub fn unstaged(&self) -> u32 {
            match self {
                Self::Dirty { unstaged, .. } => *unstaged,
                Self::Clean => 0,
            }
        }

        /// Untracked path count (0 when clean)
        #[must_use]
        pub fn untracked(&self) -> u32 {
            match self {
                Self::Dirty { untracked, .. } => *untracked,
                Self::Clean => 0,
            }
        }

        /// Sum of all three counts
        #[must_use]
        pub fn total_changes(&self) -> u32 {
            self.staged() + self.unstaged() + self.untracked()
        }

        /// Display rank: dirty before clean, then most changes first.
        ///
        /// Two dirty statuses with the same total rank equal even when their
        /// individual counts differ.
        #[must_use]
        pub fn rank(&self) -> (u8, Reverse<u32>) {
            match self {
                Self::Dirty { .. } => (0, Reverse(self.total_changes())),
                Self::Clean => (1, Reverse(0)),
            }
        }

        /// Compare two statuses by display rank
        #[must_use]
        pub fn cmp_rank(&self, other: &Self) -> Ordering {
            self.rank().cmp(&other.rank())
        }
    }

    // =========================================================================
    // Repository
    // =========================================================================

    /// One inspected repository, rebuilt from scratch on every scan
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Repository {
        /// Unique key: the absolute working-tree path
        pub id: String,
        /// Working-tree path
        pub path: PathBuf,
        /// Last path component
        pub name: String,
        /// Current branch, or `HEAD` when detached
        pub branch: String,
        /// Change summary
        pub status: RepositoryStatus,
        /// Author date of the most recent commit, if there is one
        pub last_commit_at: Option<DateTime<Utc>>,
        /// Subject of the most recent commit, empty without commits
        pub last_commit_message: String,
    }

    impl Repository {
        /// Assemble a repository record for `path`
        #[must_use]
        pub fn new(
            path: &Path,
            branch: String,
            status: RepositoryStatus,
            last_commit_at: Option<DateTime<Utc>>,
            last_commit_message: String,
        ) -> Self {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Self {
                id: path.display().to_string(),
                path: path.to_path_buf(),
                name,
                branch,
                status,
                last_commit_at,
                last_commit_message,
            }
        }

        /// Compare two repositories for the scan-result order
        #[must_use]
        pub fn cmp_display(&self, other: &Self) -> Ordering {
            self.status.cmp_rank(&other.status)
        }
    }

    // =========================================================================
    // Scan Snapshot
    // =========================================================================

    /// The published view of the most recent scan
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
    pub struct ScanSnapshot {
        /// Ordered repositories from the last completed scan
        pub repositories: Vec<Repository>,
        /// True strictly between a scan's start and its completion
        pub is_scanning: bool,
        /// When the last scan completed, if any has
        pub last_scan_completed_at: Option<DateTime<Utc>>,
    }

    impl ScanSnapshot {
        /// Repositories to show under the given display filter
        #[must_use]
        pub fn filtered(&self, show_all: bool) -> Vec<&Repository> {
            self.repositories
                .iter()
                .filter(|r| show_all || r.status.is_dirty())
                .collect()
        }

        /// Number of repositories with uncommitted changes
        #[must_use]
        pub fn dirty_count(&self) -> usize {
            self.repositories
                .iter()
                .filter(|r| r.status.is_dirty())
                .count()
        }

        /// Number of clean repositories
        #[must_use]
        pub fn clean_count(&self) -> usize {
            self.repositories.len() - self.dirty_count()
        }

        /// Staged paths summed over all repositories
        #[must_use]
        pub fn staged_count(&self) -> u64 {
            self.repositories
                .iter()
                .map(|r| u64::from(r.status.staged()))
                .sum()
        }
    }

    /// What a call to `scan()` ended up doing
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ScanOutcome {
        /// This call ran the scan and published its result
        Completed {
            /// Repositories in the new result
            repositories: usize,
        },
        /// Another scan was in flight; this call waited for it instead
        Joined,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}

#[cfg(test)]
mod tests {
    use super::types::*;
    use std::path::Path;

    fn repo(name: &str, status: RepositoryStatus) -> Repository {
        Repository::new(
            &Path::new("/work").join(name),
            "main".into(),
            status,
            None,
            String::new(),
        )
    }

    #[test]
    fn test_zero_counts_are_clean() {
        assert_eq!(RepositoryStatus::from_counts(0, 0, 0), RepositoryStatus::Clean);
        assert_eq!(
            RepositoryStatus::from_counts(2, 1, 0),
            RepositoryStatus::Dirty {
                staged: 2,
                unstaged: 1,
                untracked: 0
            }
        );
    }

    #[test]
    fn test_total_changes() {
        assert_eq!(RepositoryStatus::Clean.total_changes(), 0);
        assert_eq!(RepositoryStatus::from_counts(2, 1, 4).total_changes(), 7);
    }

    #[test]
    fn test_dirty_ranks_before_clean() {
        let dirty = RepositoryStatus::from_counts(0, 0, 1);
        assert!(dirty.cmp_rank(&RepositoryStatus::Clean).is_lt());
        assert!(RepositoryStatus::Clean.cmp_rank(&dirty).is_gt());
        assert!(RepositoryStatus::Clean
            .cmp_rank(&RepositoryStatus::Clean)
            .is_eq());
    }

    #[test]
    fn test_more_changes_rank_first() {
        let big = RepositoryStatus::from_counts(5, 0, 0);
        let small = RepositoryStatus::from_counts(1, 1, 0);
        assert!(big.cmp_rank(&small).is_lt());
        // equal totals share a rank
        let other = RepositoryStatus::from_counts(0, 2, 0);
        assert!(small.cmp_rank(&other).is_eq());
    }

    #[test]
    fn test_repository_name_is_last_component() {
        let r = repo("alpha", RepositoryStatus::Clean);
        assert_eq!(r.name, "alpha");
        assert_eq!(r.id, "/work/alpha");
    }

    #[test]
    fn test_snapshot_counts() {
        let snapshot = ScanSnapshot {
            repositories: vec![
                repo("a", RepositoryStatus::from_counts(2, 0, 0)),
                repo("b", RepositoryStatus::from_counts(1, 3, 0)),
                repo("c", RepositoryStatus::Clean),
            ],
            is_scanning: false,
            last_scan_completed_at: None,
        };

        assert_eq!(snapshot.dirty_count(), 2);
        assert_eq!(snapshot.clean_count(), 1);
        assert_eq!(snapshot.staged_count(), 3);
        assert_eq!(snapshot.filtered(false).len(), 2);
        assert_eq!(snapshot.filtered(true).len(), 3);
    }

    #[test]
    fn test_status_serializes_tagged() {
        let json = serde_json::to_string(&RepositoryStatus::from_counts(1, 0, 0)).unwrap();
        assert_eq!(json, r#"{"state":"dirty","staged":1,"unstaged":0,"untracked":0}"#);
        let json = serde_json::to_string(&RepositoryStatus::Clean).unwrap();
        assert_eq!(json, r#"{"state":"clean"}"#);
    }
}
