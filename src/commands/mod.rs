// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod filter;
pub mod open;
pub mod roots;
pub mod scan;
pub mod watch;

use repowatch::config::Config;
use repowatch::scheduler::ScanScheduler;
use repowatch::store::JsonFileStore;
use std::sync::Arc;

/// Settings shared by every command
pub struct Context {
    /// Effective configuration
    pub config: Config,
    /// Emit JSON instead of text
    pub json: bool,
    /// Colorize text output
    pub color: bool,
    /// Suppress informational output
    pub quiet: bool,
}

impl Context {
    /// Preference store in the data directory
    pub fn store(&self) -> Arc<JsonFileStore> {
        Arc::new(JsonFileStore::in_dir(&self.config.data_dir))
    }

    /// Scheduler over the persisted configuration
    pub fn scheduler(&self) -> ScanScheduler {
        ScanScheduler::from_config(&self.config, self.store())
    }
}
