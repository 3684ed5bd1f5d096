// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fire-and-forget desktop actions on a repository path

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Side effects a presenter can request for a repository
pub trait PathActions: Send + Sync {
    /// Open a terminal whose working directory is `path`
    fn open_terminal(&self, path: &Path);

    /// Show `path` in the platform file browser
    fn reveal(&self, path: &Path);
}

/// Launches the platform's own terminal and file browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemActions;

impl SystemActions {
    fn launch(mut command: Command, what: &str, path: &Path) {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        match command.spawn() {
            Ok(child) => debug!("Started {} for {} (pid {})", what, path.display(), child.id()),
            Err(e) => warn!("Failed to open {} for {}: {}", what, path.display(), e),
        }
    }
}

impl PathActions for SystemActions {
    fn open_terminal(&self, path: &Path) {
        let command = if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.args(["-a", "Terminal"]).arg(path);
            c
        } else if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "cmd"]).current_dir(path);
            c
        } else {
            let terminal =
                std::env::var("TERMINAL").unwrap_or_else(|_| "x-terminal-emulator".to_string());
            let mut c = Command::new(terminal);
            c.current_dir(path);
            c
        };
        Self::launch(command, "terminal", path);
    }

    fn reveal(&self, path: &Path) {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer"
        } else {
            "xdg-open"
        };
        let mut command = Command::new(opener);
        command.arg(path);
        Self::launch(command, "file browser", path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(&'static str, PathBuf)>>,
    }

    impl PathActions for Recording {
        fn open_terminal(&self, path: &Path) {
            self.calls.lock().unwrap().push(("terminal", path.to_path_buf()));
        }
        fn reveal(&self, path: &Path) {
            self.calls.lock().unwrap().push(("reveal", path.to_path_buf()));
        }
    }

    fn open_both(actions: &dyn PathActions, path: &Path) {
        actions.open_terminal(path);
        actions.reveal(path);
    }

    #[test]
    fn test_actions_are_substitutable() {
        let recording = Recording::default();
        open_both(&recording, Path::new("/src/app"));

        let calls = recording.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("terminal", PathBuf::from("/src/app")),
                ("reveal", PathBuf::from("/src/app")),
            ]
        );
    }
}
