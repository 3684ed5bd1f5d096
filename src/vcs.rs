// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Version-control queries run against a working tree
//!
//! Every query yields plain text. Failures of any kind (missing binary,
//! non-zero exit, timeout) come back as an empty string: callers treat that as
//! "nothing to report" rather than as an error.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default per-process time limit
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The three queries the inspector needs from a version-control tool
#[async_trait]
pub trait VcsQuery: Send + Sync {
    /// Abbreviated name of the current branch, `HEAD` when detached
    async fn current_branch(&self, workdir: &Path) -> String;

    /// Short-format porcelain status listing
    async fn status_porcelain(&self, workdir: &Path) -> String;

    /// `<ISO-8601 author date>\n<subject>` of the most recent commit
    async fn last_commit(&self, workdir: &Path) -> String;
}

/// Why a git invocation produced no usable output
#[derive(Debug, Error)]
pub enum VcsError {
    /// The process could not be started
    #[error("failed to start {binary}: {source}")]
    Spawn {
        /// Binary that was invoked
        binary: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The process did not finish in time and was killed
    #[error("git {args} timed out after {elapsed:?}")]
    Timeout {
        /// Arguments, space-joined
        args: String,
        /// Limit that was exceeded
        elapsed: Duration,
    },
    /// The process exited unsuccessfully
    #[error("git {args} exited with {status}")]
    Exit {
        /// Arguments, space-joined
        args: String,
        /// Exit status
        status: std::process::ExitStatus,
    },
    /// Waiting on the process failed
    #[error("failed waiting on git: {0}")]
    Wait(#[source] std::io::Error),
    /// Output was not UTF-8
    #[error("git {args} produced non-UTF-8 output")]
    Encoding {
        /// Arguments, space-joined
        args: String,
    },
}

/// Runs the `git` command-line tool
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git", DEFAULT_TIMEOUT)
    }
}

impl GitCli {
    /// Use `binary` with a per-invocation time limit
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Run git in `workdir` and return stdout.
    ///
    /// The child is killed if it outlives the timeout.
    pub async fn run(&self, workdir: &Path, args: &[&str]) -> Result<String, VcsError> {
        let mut command = Command::new(&self.binary);
        // a broken candidate must not resolve to an enclosing repository
        if let Some(parent) = workdir.parent() {
            command.env("GIT_CEILING_DIRECTORIES", parent);
        }

        let child = command
            .args(args)
            .current_dir(workdir)
            .env("GIT_OPTIONAL_LOCKS", "0")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| VcsError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| VcsError::Timeout {
                args: args.join(" "),
                elapsed: self.timeout,
            })?
            .map_err(VcsError::Wait)?;

        if !output.status.success() {
            return Err(VcsError::Exit {
                args: args.join(" "),
                status: output.status,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| VcsError::Encoding {
            args: args.join(" "),
        })
    }

    /// Like [`GitCli::run`], collapsing every failure to empty output
    async fn run_or_empty(&self, workdir: &Path, args: &[&str]) -> String {
        match self.run(workdir, args).await {
            Ok(out) => out,
            Err(e @ VcsError::Timeout { .. }) => {
                warn!("{} in {}", e, workdir.display());
                String::new()
            }
            Err(e) => {
                debug!("{} in {}", e, workdir.display());
                String::new()
            }
        }
    }
}

#[async_trait]
impl VcsQuery for GitCli {
    async fn current_branch(&self, workdir: &Path) -> String {
        let branch = self
            .run_or_empty(workdir, &["rev-parse", "--abbrev-ref", "HEAD"])
            .await;
        if !branch.trim().is_empty() {
            return branch;
        }
        // unborn branch: no commits yet, but HEAD still names one
        self.run_or_empty(workdir, &["symbolic-ref", "--short", "-q", "HEAD"])
            .await
    }

    async fn status_porcelain(&self, workdir: &Path) -> String {
        self.run_or_empty(workdir, &["status", "--porcelain"]).await
    }

    async fn last_commit(&self, workdir: &Path) -> String {
        self.run_or_empty(workdir, &["log", "-1", "--format=%aI%n%s"])
            .await
    }
}
