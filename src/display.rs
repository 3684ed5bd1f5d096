// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Human-readable renderings of scan data

use crate::types::{Repository, ScanSnapshot};
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use std::path::Path;

/// "time since last scan" label
#[must_use]
pub fn format_scan_age(completed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(completed_at) = completed_at else {
        return "never".to_string();
    };
    let secs = (now - completed_at).num_seconds().max(0);

    if secs < 5 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{secs}s ago")
    } else {
        format!("{}m ago", secs / 60)
    }
}

/// Relative age of a commit
#[must_use]
pub fn format_commit_age(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "-".to_string();
    };
    let secs = (now - timestamp).num_seconds().max(0);

    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => match s / 86_400 {
            1 => "yesterday".to_string(),
            days if days < 30 => format!("{days}d ago"),
            days => format!("{}mo ago", days / 30),
        },
    }
}

/// Path with the home directory shown as `~`
#[must_use]
pub fn display_path(path: &Path) -> String {
    let home = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf());
    match home.as_deref().and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

fn paint(text: String, color: bool, style: fn(&String) -> String) -> String {
    if color {
        style(&text)
    } else {
        text
    }
}

/// Two-line terminal rendering of one repository
#[must_use]
pub fn render_repository(repo: &Repository, now: DateTime<Utc>, color: bool) -> String {
    let status = &repo.status;
    let marker = if !status.is_dirty() {
        paint("✓".into(), color, |s| s.green().to_string())
    } else if status.staged() > 0 {
        paint("●".into(), color, |s| s.red().to_string())
    } else {
        paint("●".into(), color, |s| s.yellow().to_string())
    };

    let mut out = format!(
        "{} {} {}",
        marker,
        paint(repo.name.clone(), color, |s| s.bold().to_string()),
        paint(format!("[{}]", repo.branch), color, |s| s.dimmed().to_string()),
    );

    if status.staged() > 0 {
        let badge = format!("{} staged", status.staged());
        out.push_str(&format!("  {}", paint(badge, color, |s| s.red().to_string())));
    }
    if status.unstaged() > 0 {
        let badge = format!("{} modified", status.unstaged());
        out.push_str(&format!("  {}", paint(badge, color, |s| s.yellow().to_string())));
    }
    if status.untracked() > 0 {
        let badge = format!("{} untracked", status.untracked());
        out.push_str(&format!("  {}", paint(badge, color, |s| s.dimmed().to_string())));
    }

    let detail = format!(
        "{} · {} · {}",
        format_commit_age(repo.last_commit_at, now),
        repo.last_commit_message,
        display_path(&repo.path)
    );
    out.push_str(&format!("\n    {}", paint(detail, color, |s| s.dimmed().to_string())));
    out
}

/// One-line dirty/staged/clean summary
#[must_use]
pub fn render_summary(snapshot: &ScanSnapshot, now: DateTime<Utc>, color: bool) -> String {
    let dirty = format!("{} dirty", snapshot.dirty_count());
    let staged = format!("{} staged", snapshot.staged_count());
    let clean = format!("{} clean", snapshot.clean_count());
    format!(
        "{} repos found: {}, {}, {} (updated {})",
        snapshot.repositories.len(),
        paint(dirty, color, |s| s.yellow().to_string()),
        paint(staged, color, |s| s.red().to_string()),
        paint(clean, color, |s| s.green().to_string()),
        format_scan_age(snapshot.last_scan_completed_at, now)
    )
}
