//! Fire-and-forget execution of gesture commands.

use std::process::Stdio;

use guster_common::error::{GusterError, GusterResult};
use guster_gesture_core::{ActionExecutor, Launch};
use tokio::process::Command;

const DEFAULT_SHELL: &str = "/bin/sh";

/// Runs commands through `sh -c` without waiting for them.
///
/// The spawned child is dropped immediately; Tokio reaps it in the
/// background. Only failure to start is reported, never the exit status.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    dry_run: bool,
    shell: String,
}

impl ShellLauncher {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Use a different shell interpreter (must accept `-c <command>`).
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl ActionExecutor for ShellLauncher {
    fn execute(&self, command: &str) -> GusterResult<Launch> {
        if self.dry_run {
            tracing::info!(command, "Would execute (dry run)");
            return Ok(Launch::DryRun);
        }

        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| GusterError::launch(command, e))?;

        let pid = child.id();
        tracing::info!(command, pid, "Executed gesture command");
        Ok(Launch::Spawned { pid })
    }
}
