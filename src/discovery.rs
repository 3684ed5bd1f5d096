// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository discovery - bounded walk for `.git` directories

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Deepest level searched below a root (the root itself is depth 0)
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Directory names that are never descended into
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".build", "vendor", ".claude"];

/// Finds candidate working trees under a root directory
#[derive(Debug, Clone)]
pub struct RepositoryDiscovery {
    max_depth: usize,
    excluded: Vec<String>,
}

impl Default for RepositoryDiscovery {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_DEPTH,
            DEFAULT_EXCLUDED_DIRS.iter().map(ToString::to_string).collect(),
        )
    }
}

impl RepositoryDiscovery {
    /// Create a discovery pass with a depth bound and excluded directory names
    #[must_use]
    pub fn new(max_depth: usize, excluded: Vec<String>) -> Self {
        Self { max_depth, excluded }
    }

    /// Candidate repository paths under `root`, in walk order.
    ///
    /// A candidate is the real (canonical) parent of a `.git` directory found
    /// within the depth bound. Excluded directories are pruned, not just
    /// filtered. Symlinked directories are followed only while they resolve
    /// inside `root`. A missing or unreadable root yields nothing.
    #[must_use]
    pub fn discover(&self, root: &Path) -> Vec<PathBuf> {
        if self.is_excluded_path(root) {
            debug!("Root {} lies inside an excluded directory", root.display());
            return Vec::new();
        }
        let Ok(real_root) = root.canonicalize() else {
            debug!("Root {} is not accessible", root.display());
            return Vec::new();
        };

        let mut candidates = Vec::new();
        let mut visited = HashSet::new();
        let mut walker = WalkDir::new(root)
            .follow_links(true)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    trace!("Skipping entry under {}: {}", root.display(), err);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            if entry.file_name() == ".git" {
                let parent = entry
                    .path()
                    .parent()
                    .map(|p| p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
                if let Some(parent) = parent {
                    if !candidates.contains(&parent) {
                        candidates.push(parent);
                    }
                }
                walker.skip_current_dir();
                continue;
            }

            if entry.depth() > 0 && self.is_excluded_name(entry.file_name()) {
                walker.skip_current_dir();
                continue;
            }

            let Ok(real) = entry.path().canonicalize() else {
                continue;
            };
            if entry.path_is_symlink() && !real.starts_with(&real_root) {
                trace!("Not following {} out of the root", entry.path().display());
                walker.skip_current_dir();
                continue;
            }
            // never enter the same real directory twice
            if !visited.insert(real) {
                trace!("Already visited {}", entry.path().display());
                walker.skip_current_dir();
            }
        }

        debug!(
            "Discovered {} candidate(s) under {}",
            candidates.len(),
            root.display()
        );
        candidates
    }

    fn is_excluded_name(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.excluded.iter().any(|e| e == name))
    }

    fn is_excluded_path(&self, path: &Path) -> bool {
        path.components().any(|c| match c {
            Component::Normal(name) => self.is_excluded_name(name),
            _ => false,
        })
    }
}
