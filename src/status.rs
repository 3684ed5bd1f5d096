// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Parsers for `git status --porcelain` and the one-commit log query

use crate::types::RepositoryStatus;
use chrono::{DateTime, Utc};

/// Buckets a single porcelain status line contributes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineChanges {
    /// Index column shows a change
    pub staged: bool,
    /// Worktree column shows a change
    pub unstaged: bool,
    /// Path is untracked
    pub untracked: bool,
}

/// Classify one porcelain line by its two status columns.
///
/// Lines shorter than two characters contribute nothing. An untracked line
/// (`??`) only counts as untracked; any other line may count as both staged
/// and unstaged.
#[must_use]
pub fn classify(line: &str) -> LineChanges {
    let mut columns = line.chars();
    let (Some(index), Some(worktree)) = (columns.next(), columns.next()) else {
        return LineChanges::default();
    };

    if index == '?' {
        return LineChanges {
            untracked: true,
            ..LineChanges::default()
        };
    }

    LineChanges {
        staged: index != ' ',
        unstaged: worktree != ' ' && worktree != '?',
        untracked: false,
    }
}

/// Aggregated change counts for one working tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Paths with an index change
    pub staged: u32,
    /// Paths with a worktree change
    pub unstaged: u32,
    /// Untracked paths
    pub untracked: u32,
}

impl StatusCounts {
    /// Fold one classified line into the counts
    pub fn record(&mut self, changes: LineChanges) {
        self.staged += u32::from(changes.staged);
        self.unstaged += u32::from(changes.unstaged);
        self.untracked += u32::from(changes.untracked);
    }

    /// Count every non-empty line of a porcelain listing
    #[must_use]
    pub fn from_porcelain(output: &str) -> Self {
        output
            .lines()
            .filter(|l| !l.is_empty())
            .map(classify)
            .fold(Self::default(), |mut counts, changes| {
                counts.record(changes);
                counts
            })
    }

    /// Convert into a [`RepositoryStatus`]
    #[must_use]
    pub fn into_status(self) -> RepositoryStatus {
        RepositoryStatus::from_counts(self.staged, self.unstaged, self.untracked)
    }
}

/// Most recent commit as reported by `git log -1 --format=%aI%n%s`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastCommit {
    /// Author date, absent without commits or if it fails to parse
    pub timestamp: Option<DateTime<Utc>>,
    /// Subject line, empty without commits
    pub message: String,
}

impl LastCommit {
    /// Parse the two-line log output (timestamp, then subject).
    ///
    /// Anything with fewer than two lines means "no commit info".
    #[must_use]
    pub fn parse(output: &str) -> Self {
        let mut lines = output.split('\n');
        let (Some(stamp), Some(subject)) = (lines.next(), lines.next()) else {
            return Self::default();
        };

        let timestamp = DateTime::parse_from_rfc3339(stamp.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc));

        Self {
            timestamp,
            message: subject.trim_end_matches('\r').to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_lines_are_ignored() {
        assert_eq!(classify(""), LineChanges::default());
        assert_eq!(classify("M"), LineChanges::default());
    }

    #[test]
    fn test_untracked_only_counts_once() {
        let changes = classify("?? new.txt");
        assert!(changes.untracked);
        assert!(!changes.staged);
        assert!(!changes.unstaged);
    }

    #[test]
    fn test_staged_and_unstaged_on_one_line() {
        let changes = classify("MM both.txt");
        assert!(changes.staged);
        assert!(changes.unstaged);
        assert!(!changes.untracked);
    }

    #[test]
    fn test_mixed_listing() {
        let counts = StatusCounts::from_porcelain("M  a.txt\n M b.txt\n?? c.txt\n");
        assert_eq!(
            counts,
            StatusCounts {
                staged: 1,
                unstaged: 1,
                untracked: 1
            }
        );
    }

    #[test]
    fn test_renames_and_deletes() {
        let counts = StatusCounts::from_porcelain("R  old -> new\n D gone.rs\nA  added.rs\n");
        assert_eq!(counts.staged, 2);
        assert_eq!(counts.unstaged, 1);
        assert_eq!(counts.untracked, 0);
    }

    #[test]
    fn test_empty_listing_is_clean() {
        assert_eq!(StatusCounts::from_porcelain("").into_status(), RepositoryStatus::Clean);
    }

    #[test]
    fn test_parse_last_commit() {
        let commit = LastCommit::parse("2025-03-01T10:15:00+02:00\nFix the widget\n");
        assert_eq!(
            commit.timestamp,
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 8, 15, 0).unwrap())
        );
        assert_eq!(commit.message, "Fix the widget");
    }

    #[test]
    fn test_parse_last_commit_without_commits() {
        assert_eq!(LastCommit::parse(""), LastCommit::default());
    }

    #[test]
    fn test_bad_timestamp_keeps_message() {
        let commit = LastCommit::parse("yesterday\nsubject");
        assert_eq!(commit.timestamp, None);
        assert_eq!(commit.message, "subject");
    }
}
