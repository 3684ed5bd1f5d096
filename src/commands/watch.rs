// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Watch command - periodic re-scan until interrupted

use super::scan::print_snapshot;
use super::Context;
use anyhow::{Context as _, Result};
use repowatch::scheduler::ScanScheduler;
use std::time::Duration;
use tracing::info;

/// Run the watch command
pub async fn run(ctx: &Context, interval: Option<u64>, all: bool) -> Result<()> {
    let mut settings = ctx.config.scan.clone();
    if let Some(secs) = interval {
        settings.refresh_interval_secs = secs;
    }

    let scheduler = ScanScheduler::new(
        repowatch::coordinator::ScanCoordinator::from_settings(&settings),
        ctx.store(),
        Duration::from_secs(settings.refresh_interval_secs),
    );
    let show_all = all || scheduler.show_all();
    let mut updates = scheduler.subscribe();

    scheduler.start();
    info!("Watching {} root(s); Ctrl-C to stop", scheduler.roots().len());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                changed.context("Scheduler stopped")?;
                let snapshot = updates.borrow_and_update().clone();
                if !snapshot.is_scanning {
                    print_snapshot(ctx, &snapshot, show_all)?;
                    if !ctx.json {
                        println!();
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    scheduler.stop();
    Ok(())
}
