// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Filter command - which repositories scan output shows

use super::Context;
use anyhow::{Context as _, Result};
use clap::ValueEnum;

/// Display filter choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterMode {
    /// Show clean repositories too
    All,
    /// Show only repositories with changes
    Dirty,
    /// Switch between the two
    Toggle,
}

fn label(show_all: bool) -> &'static str {
    if show_all {
        "all"
    } else {
        "dirty"
    }
}

/// Run filter command
pub fn run(ctx: &Context, mode: Option<FilterMode>) -> Result<()> {
    let scheduler = ctx.scheduler();

    let show_all = match mode {
        None => scheduler.show_all(),
        Some(FilterMode::All) => {
            scheduler.set_show_all(true).context("Failed to save filter")?;
            true
        }
        Some(FilterMode::Dirty) => {
            scheduler.set_show_all(false).context("Failed to save filter")?;
            false
        }
        Some(FilterMode::Toggle) => scheduler.toggle_show_all().context("Failed to save filter")?,
    };

    println!("{}", label(show_all));
    Ok(())
}
