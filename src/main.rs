// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repowatch CLI - live working-tree status for every repository you own

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::filter::FilterMode;
use commands::Context;

#[derive(Parser)]
#[command(name = "repowatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "REPOWATCH_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "REPOWATCH_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output (also disabled by any non-empty NO_COLOR)
    #[arg(long, global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the configured roots once and print repository status
    Scan {
        /// Scan these roots instead of the configured ones
        #[arg(long = "root", value_name = "PATH")]
        roots: Vec<String>,

        /// Include clean repositories
        #[arg(long)]
        all: bool,
    },

    /// Keep re-scanning on a timer and print each result
    Watch {
        /// Seconds between scans (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,

        /// Include clean repositories
        #[arg(long)]
        all: bool,
    },

    /// Manage the directories searched for repositories
    Roots {
        #[command(subcommand)]
        action: commands::roots::RootsAction,
    },

    /// Show or change the display filter
    Filter {
        /// New mode; omit to show the current one
        mode: Option<FilterMode>,
    },

    /// Open a terminal or file browser at a path
    Open {
        /// Repository path
        path: std::path::PathBuf,

        /// Show in the file browser instead of a terminal
        #[arg(long)]
        reveal: bool,
    },

    /// Print the effective configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn init_logging(cli: &Cli, fallback: &str) {
    let default = match cli.verbose {
        0 if cli.quiet => "error",
        0 => fallback,
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `NO_COLOR` set to any non-empty value turns color off
fn no_color_env() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = repowatch::config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }

    init_logging(&cli, &config.log_level);

    let ctx = Context {
        config,
        json: cli.json,
        color: !cli.no_color && !no_color_env(),
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Scan { roots, all } => commands::scan::run(&ctx, &roots, all).await,
        Commands::Watch { interval, all } => commands::watch::run(&ctx, interval, all).await,
        Commands::Roots { action } => commands::roots::run(&ctx, action),
        Commands::Filter { mode } => commands::filter::run(&ctx, mode),
        Commands::Open { path, reveal } => commands::open::run(&path, reveal),
        Commands::Config => commands::config::run(&ctx),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}
