// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use anyhow::Result;
use repowatch::actions::{PathActions, SystemActions};
use std::path::Path;

pub fn run(path: &Path, reveal: bool) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Not a directory: {}", path.display());
    }

    let actions = SystemActions;
    if reveal {
        actions.reveal(path);
    } else {
        actions.open_terminal(path);
    }
    Ok(())
}
