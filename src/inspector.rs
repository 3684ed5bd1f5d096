// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository inspection - turns a candidate path into a [`Repository`]

use crate::status::{LastCommit, StatusCounts};
use crate::types::Repository;
use crate::vcs::VcsQuery;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Inspects candidate working trees through a [`VcsQuery`]
#[derive(Clone)]
pub struct RepositoryInspector {
    vcs: Arc<dyn VcsQuery>,
}

impl RepositoryInspector {
    /// Create an inspector backed by `vcs`
    pub fn new(vcs: Arc<dyn VcsQuery>) -> Self {
        Self { vcs }
    }

    /// Inspect `candidate`.
    ///
    /// Returns `None` when no branch can be resolved; such candidates are
    /// dropped, not reported. Failed status or log queries degrade to a clean
    /// status and absent commit info.
    pub async fn inspect(&self, candidate: &Path) -> Option<Repository> {
        let branch = self.vcs.current_branch(candidate).await;
        let branch = branch.trim();
        if branch.is_empty() {
            debug!("Rejecting {}: no branch", candidate.display());
            return None;
        }

        let status = StatusCounts::from_porcelain(&self.vcs.status_porcelain(candidate).await)
            .into_status();
        let commit = LastCommit::parse(&self.vcs.last_commit(candidate).await);

        trace!(
            "Inspected {} on {}: {} change(s)",
            candidate.display(),
            branch,
            status.total_changes()
        );

        Some(Repository::new(
            candidate,
            branch.to_string(),
            status,
            commit.timestamp,
            commit.message,
        ))
    }
}

impl std::fmt::Debug for RepositoryInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryInspector").finish_non_exhaustive()
    }
}
