//! Command dispatch into the running workspace container
//!
//! Commands go through `docker exec` with the caller's terminal passed
//! straight through, so interactive sessions behave like a local shell.

use crate::error::{DbpError, Result};
use crate::workspace::{Workspace, MOUNT_POINT};
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Script inside the image that sets up the build user before running the
/// requested command
pub const ENTRYPOINT_SCRIPT: &str = "/entrypoint.sh";

/// Runs the docker command-line client
pub trait DockerCli {
    /// Run `docker <args>` attached to this process's stdio, returning
    /// whether it exited successfully
    fn run(&self, args: &[String]) -> io::Result<bool>;
}

/// The `docker` binary found on `PATH`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDocker;

impl DockerCli for SystemDocker {
    fn run(&self, args: &[String]) -> io::Result<bool> {
        let status = Command::new("docker")
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.success())
    }
}

/// Locate the docker client, failing if it is not installed
pub fn ensure_docker_cli() -> Result<PathBuf> {
    which::which("docker").map_err(|_| DbpError::DockerCliMissing)
}

/// Executes commands in the workspace container
pub struct Dispatcher<'a, C> {
    workspace: &'a Workspace,
    cli: C,
}

impl<'a, C: DockerCli> Dispatcher<'a, C> {
    pub fn new(workspace: &'a Workspace, cli: C) -> Self {
        Self { workspace, cli }
    }

    pub fn workspace(&self) -> &Workspace {
        self.workspace
    }

    pub fn cli(&self) -> &C {
        &self.cli
    }

    /// Arguments for `docker` running `command` in `work_dir`
    pub fn exec_args(&self, command: &[String], work_dir: &str) -> Vec<String> {
        let work_dir = if work_dir.is_empty() {
            MOUNT_POINT
        } else {
            work_dir
        };

        let mut args = vec![
            "exec".to_string(),
            "--tty".to_string(),
            format!("--workdir={}", work_dir),
        ];
        if self.workspace.interactive {
            args.push("--interactive".to_string());
        }
        args.extend(
            self.workspace
                .env_strings()
                .into_iter()
                .map(|kv| format!("-e={}", kv)),
        );
        args.push(self.workspace.container_name.clone());
        args.push(ENTRYPOINT_SCRIPT.to_string());
        args.extend(command.iter().cloned());
        args
    }

    /// Run `command` in the container. An empty `work_dir` means the
    /// workspace root. Returns whether the command exited with status zero.
    pub fn exec(&self, command: &[String], work_dir: &str) -> bool {
        let args = self.exec_args(command, work_dir);
        debug!(
            "Running {:?} in {}...",
            command,
            if work_dir.is_empty() { MOUNT_POINT } else { work_dir }
        );

        match self.cli.run(&args) {
            Ok(success) => success,
            Err(e) => {
                warn!("Failed to run docker: {}", e);
                false
            }
        }
    }
}
