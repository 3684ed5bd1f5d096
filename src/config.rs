// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management

use crate::coordinator::DEFAULT_CONCURRENCY;
use crate::discovery::{DEFAULT_EXCLUDED_DIRS, DEFAULT_MAX_DEPTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for persistent data (preferences)
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Scanner tuning
    pub scan: ScanSettings,
}

/// Knobs for discovery, inspection and the refresh timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Deepest directory level searched below each root
    pub max_depth: usize,
    /// Directory names never descended into
    pub excluded_dirs: Vec<String>,
    /// Seconds between automatic re-scans
    pub refresh_interval_secs: u64,
    /// Seconds before a single git invocation is killed
    pub git_timeout_secs: u64,
    /// Repositories inspected at once
    pub concurrency: usize,
    /// Git executable
    pub git_binary: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(ToString::to_string).collect(),
            refresh_interval_secs: 120,
            git_timeout_secs: 30,
            concurrency: DEFAULT_CONCURRENCY,
            git_binary: "git".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: project_dirs()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("~/.local/share/repowatch")),
            log_level: "info".to_string(),
            scan: ScanSettings::default(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "hyperpolymath", "repowatch")
}

/// Default location of the configuration file
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration: built-in defaults, then the TOML file (if present),
/// then `REPOWATCH_*` environment variables.
pub fn load(file: Option<&Path>) -> Result<Config> {
    let defaults = config::Config::try_from(&Config::default())
        .context("Failed to build default configuration")?;

    let mut builder = config::Config::builder().add_source(defaults);

    match file {
        Some(path) => {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            if let Some(path) = default_config_file() {
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }
    }

    let config: Config = builder
        .add_source(
            config::Environment::with_prefix("REPOWATCH")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("scan.excluded_dirs")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    Ok(Config {
        data_dir: expand_home(&config.data_dir.to_string_lossy()),
        ..config
    })
}

// =============================================================================
// Paths
// =============================================================================

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Expand a leading `~` to the home directory
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Normalised form of a root path: `~` expanded, made absolute against the
/// current directory, `.` segments and trailing separators dropped.
#[must_use]
pub fn normalize_root(path: &str) -> PathBuf {
    let expanded = expand_home(path.trim());
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    };

    absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Roots used when none have been saved: a projects directory and the desktop
#[must_use]
pub fn default_roots() -> Vec<PathBuf> {
    let Some(home) = home_dir() else {
        return Vec::new();
    };

    let projects = if cfg!(target_os = "macos") {
        home.join("Developer")
    } else {
        home.join("projects")
    };
    let desktop = directories::UserDirs::new()
        .and_then(|d| d.desktop_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| home.join("Desktop"));

    vec![projects, desktop]
}
