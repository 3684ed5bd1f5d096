// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use super::Context;
use anyhow::{Context as _, Result};

pub fn run(ctx: &Context) -> Result<()> {
    if ctx.json {
        let json =
            serde_json::to_string_pretty(&ctx.config).context("Failed to serialize configuration")?;
        println!("{json}");
    } else {
        let text = toml::to_string_pretty(&ctx.config).context("Failed to serialize configuration")?;
        print!("{text}");
    }
    Ok(())
}
