// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Scan coordination - fan out discovery and inspection, then order the result

use crate::config::ScanSettings;
use crate::discovery::RepositoryDiscovery;
use crate::inspector::RepositoryInspector;
use crate::types::Repository;
use crate::vcs::GitCli;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Default number of repositories inspected at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Runs one full discovery-and-inspection pass
#[derive(Debug, Clone)]
pub struct ScanCoordinator {
    discovery: Arc<RepositoryDiscovery>,
    inspector: RepositoryInspector,
    concurrency: usize,
}

impl ScanCoordinator {
    /// Create a coordinator; `concurrency` is clamped to at least 1
    #[must_use]
    pub fn new(
        discovery: RepositoryDiscovery,
        inspector: RepositoryInspector,
        concurrency: usize,
    ) -> Self {
        Self {
            discovery: Arc::new(discovery),
            inspector,
            concurrency: concurrency.max(1),
        }
    }

    /// Git-backed coordinator tuned by `settings`
    #[must_use]
    pub fn from_settings(settings: &ScanSettings) -> Self {
        let git = GitCli::new(
            &settings.git_binary,
            Duration::from_secs(settings.git_timeout_secs.max(1)),
        );
        Self::new(
            RepositoryDiscovery::new(settings.max_depth, settings.excluded_dirs.clone()),
            RepositoryInspector::new(Arc::new(git)),
            settings.concurrency,
        )
    }

    /// Scan every root and return the ordered, de-duplicated repositories.
    ///
    /// Nothing here fails: unreadable roots contribute no candidates and
    /// rejected candidates are dropped.
    pub async fn run_scan(&self, roots: &[PathBuf]) -> Vec<Repository> {
        let started = Instant::now();

        let walks = roots.iter().cloned().map(|root| {
            let discovery = Arc::clone(&self.discovery);
            tokio::task::spawn_blocking(move || discovery.discover(&root))
        });

        let mut seen = HashSet::new();
        let candidates: Vec<PathBuf> = join_all(walks)
            .await
            .into_iter()
            .zip(roots)
            .flat_map(|(walk, root)| {
                walk.unwrap_or_else(|e| {
                    warn!("Discovery under {} failed: {}", root.display(), e);
                    Vec::new()
                })
            })
            .filter(|candidate| seen.insert(candidate.clone()))
            .collect();

        let candidate_count = candidates.len();
        let inspected: Vec<Repository> = stream::iter(candidates)
            .map(|candidate| {
                let inspector = self.inspector.clone();
                async move { inspector.inspect(&candidate).await }
            })
            .buffered(self.concurrency)
            .filter_map(|repo| async move { repo })
            .collect()
            .await;

        let repositories = order_repositories(inspected);
        info!(
            "Scanned {} root(s): {} candidate(s), {} repositories in {:.2?}",
            roots.len(),
            candidate_count,
            repositories.len(),
            started.elapsed()
        );
        repositories
    }
}

/// Final scan-result order: drop repeated ids (first one wins), then a stable
/// sort by status rank.
#[must_use]
pub fn order_repositories(repositories: Vec<Repository>) -> Vec<Repository> {
    let mut seen = HashSet::new();
    let mut ordered: Vec<Repository> = repositories
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    ordered.sort_by(Repository::cmp_display);
    ordered
}
