// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Scan scheduling - owns the configured roots, the display filter, the last
//! published scan and the refresh timer.
//!
//! Manual refreshes and timer ticks go through the same [`ScanScheduler::scan`]
//! entry point. At most one scan runs at a time: a `scan()` issued while
//! another is in flight waits for that one and reports
//! [`ScanOutcome::Joined`].

use crate::config::{default_roots, normalize_root, Config};
use crate::coordinator::ScanCoordinator;
use crate::display::format_scan_age;
use crate::store::{KeyValueStore, KeyValueStoreExt, StoreError};
use crate::types::{Repository, ScanOutcome, ScanSnapshot};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Preference key holding the ordered root list
pub const ROOTS_KEY: &str = "scan_roots";

/// Preference key holding the display filter (true = show clean repositories)
pub const SHOW_ALL_KEY: &str = "show_all";

/// Time between automatic re-scans
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(120);

/// User-mutable scan configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfiguration {
    /// Directories searched for repositories, in order
    pub roots: Vec<PathBuf>,
    /// Show clean repositories too, not only dirty ones
    pub show_all: bool,
}

impl ScanConfiguration {
    /// Load from `store`, falling back to the default roots and the
    /// dirty-only filter
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let roots = store
            .load::<Vec<String>>(ROOTS_KEY)
            .map(|roots| roots.into_iter().map(PathBuf::from).collect())
            .unwrap_or_else(default_roots);
        let show_all = store.load::<bool>(SHOW_ALL_KEY).unwrap_or(false);

        Self { roots, show_all }
    }
}

/// Handle to the scheduler; clones share the same state
#[derive(Clone)]
pub struct ScanScheduler {
    shared: Arc<Shared>,
}

struct Shared {
    coordinator: ScanCoordinator,
    store: Arc<dyn KeyValueStore>,
    settings: RwLock<ScanConfiguration>,
    snapshot: watch::Sender<ScanSnapshot>,
    refresh_interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl ScanScheduler {
    /// Create an idle scheduler; the configuration is read from `store`
    pub fn new(
        coordinator: ScanCoordinator,
        store: Arc<dyn KeyValueStore>,
        refresh_interval: Duration,
    ) -> Self {
        let settings = ScanConfiguration::load(store.as_ref());
        debug!("Loaded {} scan root(s)", settings.roots.len());

        let (snapshot, _) = watch::channel(ScanSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                coordinator,
                store,
                settings: RwLock::new(settings),
                snapshot,
                refresh_interval,
                timer: Mutex::new(None),
            }),
        }
    }

    /// Build a git-backed scheduler from application configuration
    pub fn from_config(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            ScanCoordinator::from_settings(&config.scan),
            store,
            Duration::from_secs(config.scan.refresh_interval_secs),
        )
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Run a scan, or wait for the one already in flight
    pub async fn scan(&self) -> ScanOutcome {
        self.shared.scan().await
    }

    /// Start a scan in the background without waiting for it
    pub fn trigger(&self) -> JoinHandle<ScanOutcome> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.scan().await })
    }

    /// Start the refresh timer. Its first tick fires immediately and performs
    /// the startup scan. Calling `start` twice has no extra effect.
    pub fn start(&self) {
        let mut timer = self
            .shared
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if timer.is_some() {
            return;
        }

        let period = self.shared.refresh_interval.max(Duration::from_secs(1));
        let weak = Arc::downgrade(&self.shared);
        info!("Refreshing every {:?}", period);

        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(shared) = weak.upgrade() else { break };
                shared.scan().await;
            }
        }));
    }

    /// Cancel the refresh timer; an in-flight scan is abandoned
    pub fn stop(&self) {
        if let Some(timer) = self
            .shared
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            timer.abort();
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Add a root. Returns `false` when it (normalised) is already configured
    /// or blank.
    pub fn add_root(&self, path: &str) -> Result<bool, StoreError> {
        if path.trim().is_empty() {
            return Ok(false);
        }
        let root = normalize_root(path);

        let mut settings = self.shared.write_settings();
        if settings
            .roots
            .iter()
            .any(|r| normalize_root(&r.to_string_lossy()) == root)
        {
            debug!("Root {} already configured", root.display());
            return Ok(false);
        }

        info!("Adding root {}", root.display());
        let mut roots = settings.roots.clone();
        roots.push(root);
        self.shared.persist_roots(&roots)?;
        settings.roots = roots;
        Ok(true)
    }

    /// Remove every configured root equal to `path`. Returns whether any was
    /// removed; removing an unknown root changes nothing.
    pub fn remove_root(&self, path: &str) -> Result<bool, StoreError> {
        let literal = Path::new(path);
        let normalized = normalize_root(path);

        let mut settings = self.shared.write_settings();
        let roots: Vec<PathBuf> = settings
            .roots
            .iter()
            .filter(|r| r.as_path() != literal && **r != normalized)
            .cloned()
            .collect();

        if roots.len() == settings.roots.len() {
            debug!("Root {} not configured", path);
            return Ok(false);
        }

        self.shared.persist_roots(&roots)?;
        settings.roots = roots;
        info!("Removed root {}", path);
        Ok(true)
    }

    /// Set the display filter
    pub fn set_show_all(&self, show_all: bool) -> Result<(), StoreError> {
        let mut settings = self.shared.write_settings();
        self.shared.store.save(SHOW_ALL_KEY, &show_all)?;
        settings.show_all = show_all;
        Ok(())
    }

    /// Flip the display filter, returning the new value
    pub fn toggle_show_all(&self) -> Result<bool, StoreError> {
        let mut settings = self.shared.write_settings();
        let show_all = !settings.show_all;
        self.shared.store.save(SHOW_ALL_KEY, &show_all)?;
        settings.show_all = show_all;
        Ok(show_all)
    }

    /// Configured roots, in order
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        self.shared.roots()
    }

    /// Current display filter
    #[must_use]
    pub fn show_all(&self) -> bool {
        self.shared.read_settings().show_all
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Copy of the last published scan
    #[must_use]
    pub fn snapshot(&self) -> ScanSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    /// Receiver notified whenever a scan starts or completes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.shared.snapshot.subscribe()
    }

    /// Repositories to display under the current filter, in scan order
    #[must_use]
    pub fn filtered_repositories(&self) -> Vec<Repository> {
        let show_all = self.show_all();
        self.shared
            .snapshot
            .borrow()
            .filtered(show_all)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Repositories with uncommitted changes in the last scan
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.shared.snapshot.borrow().dirty_count()
    }

    /// Staged paths across all repositories in the last scan
    #[must_use]
    pub fn staged_count(&self) -> u64 {
        self.shared.snapshot.borrow().staged_count()
    }

    /// Whether a scan is in flight
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.shared.snapshot.borrow().is_scanning
    }

    /// "time since last scan" label
    #[must_use]
    pub fn last_scan_ago(&self) -> String {
        format_scan_age(
            self.shared.snapshot.borrow().last_scan_completed_at,
            Utc::now(),
        )
    }
}

impl std::fmt::Debug for ScanScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanScheduler")
            .field("settings", &*self.shared.read_settings())
            .field("refresh_interval", &self.shared.refresh_interval)
            .finish_non_exhaustive()
    }
}

impl Shared {
    async fn scan(&self) -> ScanOutcome {
        let claimed = self.snapshot.send_if_modified(|s| {
            if s.is_scanning {
                false
            } else {
                s.is_scanning = true;
                true
            }
        });

        if !claimed {
            debug!("Scan already in flight, joining it");
            let mut rx = self.snapshot.subscribe();
            if rx.wait_for(|s| !s.is_scanning).await.is_err() {
                debug!("Scan state closed while waiting");
            }
            return ScanOutcome::Joined;
        }

        let mut in_flight = InFlight {
            snapshot: &self.snapshot,
            finished: false,
        };

        let roots = self.roots();
        let repositories = self.coordinator.run_scan(&roots).await;
        let count = repositories.len();

        self.snapshot.send_modify(|s| {
            *s = ScanSnapshot {
                repositories,
                is_scanning: false,
                last_scan_completed_at: Some(Utc::now()),
            };
        });
        in_flight.finished = true;

        ScanOutcome::Completed {
            repositories: count,
        }
    }

    fn roots(&self) -> Vec<PathBuf> {
        self.read_settings().roots.clone()
    }

    fn read_settings(&self) -> std::sync::RwLockReadGuard<'_, ScanConfiguration> {
        self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_settings(&self) -> std::sync::RwLockWriteGuard<'_, ScanConfiguration> {
        self.settings.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist_roots(&self, roots: &[PathBuf]) -> Result<(), StoreError> {
        let roots: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
        self.store.save(ROOTS_KEY, &roots).map_err(|e| {
            warn!("Failed to save scan roots: {}", e);
            e
        })
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(timer) = self
            .timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            timer.abort();
        }
    }
}

/// Clears `is_scanning` if a scan is dropped before it publishes
struct InFlight<'a> {
    snapshot: &'a watch::Sender<ScanSnapshot>,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Scan abandoned before completion");
            self.snapshot.send_modify(|s| s.is_scanning = false);
        }
    }
}
