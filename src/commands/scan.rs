// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Scan command - one discovery-and-inspection pass, printed

use super::Context;
use anyhow::{Context as _, Result};
use chrono::Utc;
use repowatch::config::normalize_root;
use repowatch::coordinator::ScanCoordinator;
use repowatch::display::{render_repository, render_summary};
use repowatch::types::ScanSnapshot;
use tracing::info;

/// Run the scan command
pub async fn run(ctx: &Context, roots: &[String], all: bool) -> Result<()> {
    let (snapshot, show_all) = if roots.is_empty() {
        let scheduler = ctx.scheduler();
        info!("Scanning {} configured root(s)", scheduler.roots().len());
        scheduler.scan().await;
        (scheduler.snapshot(), all || scheduler.show_all())
    } else {
        let roots: Vec<_> = roots.iter().map(|r| normalize_root(r)).collect();
        let repositories = ScanCoordinator::from_settings(&ctx.config.scan)
            .run_scan(&roots)
            .await;
        let snapshot = ScanSnapshot {
            repositories,
            is_scanning: false,
            last_scan_completed_at: Some(Utc::now()),
        };
        (snapshot, all)
    };

    print_snapshot(ctx, &snapshot, show_all)
}

/// Print a snapshot under the given filter
pub fn print_snapshot(ctx: &Context, snapshot: &ScanSnapshot, show_all: bool) -> Result<()> {
    let visible = snapshot.filtered(show_all);

    if ctx.json {
        let json = serde_json::to_string_pretty(&visible).context("Failed to serialize scan")?;
        println!("{json}");
        return Ok(());
    }

    let now = Utc::now();
    if !ctx.quiet {
        println!("{}", render_summary(snapshot, now, ctx.color));
        println!();
    }

    if visible.is_empty() {
        if show_all {
            println!("No repos found");
        } else {
            println!("All repos are clean");
            if !snapshot.repositories.is_empty() {
                println!("Use --all to see {} repos", snapshot.repositories.len());
            }
        }
        return Ok(());
    }

    for repo in visible {
        println!("{}", render_repository(repo, now, ctx.color));
    }
    Ok(())
}
