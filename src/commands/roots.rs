// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Roots command - list, add and remove scan roots

use super::Context;
use anyhow::{Context as _, Result};
use clap::Subcommand;
use repowatch::display::display_path;

/// Root list operations
#[derive(Debug, Subcommand)]
pub enum RootsAction {
    /// Show the configured roots
    #[command(alias = "ls")]
    List,
    /// Add a directory (a leading ~ is expanded)
    Add {
        /// Directory to add
        path: String,
    },
    /// Remove a directory
    #[command(alias = "rm")]
    Remove {
        /// Directory to remove
        path: String,
    },
}

/// Run roots command
pub fn run(ctx: &Context, action: RootsAction) -> Result<()> {
    let scheduler = ctx.scheduler();

    match action {
        RootsAction::List => {
            let roots = scheduler.roots();
            if ctx.json {
                let json = serde_json::to_string_pretty(&roots).context("Failed to serialize roots")?;
                println!("{json}");
                return Ok(());
            }
            if roots.is_empty() {
                println!("No scan roots. Use 'repowatch roots add <path>' to add one.");
                return Ok(());
            }
            for root in roots {
                let marker = if root.is_dir() { "" } else { "  (missing)" };
                println!("{}{}", display_path(&root), marker);
            }
        }

        RootsAction::Add { path } => {
            if scheduler
                .add_root(&path)
                .with_context(|| format!("Failed to save root {path}"))?
            {
                println!("Added {path}");
            } else {
                println!("{path} already configured");
            }
        }

        RootsAction::Remove { path } => {
            if scheduler
                .remove_root(&path)
                .with_context(|| format!("Failed to save roots after removing {path}"))?
            {
                println!("Removed {path}");
            } else {
                println!("{path} not configured");
            }
        }
    }

    Ok(())
}
