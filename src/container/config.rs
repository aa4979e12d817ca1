//! Container configuration

use serde::Serialize;
use std::path::PathBuf;

/// Volume mount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeMount {
    pub host_path: PathBuf,
    pub container_path: String,
    pub read_only: bool,
}

impl VolumeMount {
    /// Read-write bind mount
    pub fn read_write(host_path: impl Into<PathBuf>, container_path: &str) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.to_string(),
            read_only: false,
        }
    }

    /// Read-only bind mount
    pub fn read_only(host_path: impl Into<PathBuf>, container_path: &str) -> Self {
        Self {
            read_only: true,
            ..Self::read_write(host_path, container_path)
        }
    }
}

impl std::fmt::Display for VolumeMount {
    /// Docker bind syntax, `host:container:rw|ro`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.host_path.display(),
            self.container_path,
            if self.read_only { "ro" } else { "rw" }
        )
    }
}

/// Everything needed to create the workspace container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Container name
    pub name: String,
    /// Image name/tag
    pub image: String,
    /// Hostname
    pub hostname: String,
    /// Allocate a pseudo-terminal
    pub tty: bool,
    /// Keep stdin open
    pub open_stdin: bool,
    /// Environment as `KEY=VALUE`
    pub env: Vec<String>,
    /// Entry point
    pub entrypoint: Vec<String>,
    /// Command passed to the entry point
    pub cmd: Vec<String>,
    /// Bind mounts in Docker syntax
    pub binds: Vec<String>,
}

impl ContainerSpec {
    /// Create a new container spec
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            hostname: name.to_string(),
            tty: false,
            open_stdin: false,
            env: Vec::new(),
            entrypoint: Vec::new(),
            cmd: Vec::new(),
            binds: Vec::new(),
        }
    }

    /// Set hostname
    pub fn hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    /// Allocate a pseudo-terminal
    pub fn tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    /// Keep stdin open
    pub fn open_stdin(mut self, open: bool) -> Self {
        self.open_stdin = open;
        self
    }

    /// Add environment variable
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push(format!("{}={}", key, value));
        self
    }

    /// Set entry point and its command
    pub fn entrypoint(mut self, entrypoint: &[&str], cmd: &[&str]) -> Self {
        self.entrypoint = entrypoint.iter().map(|s| s.to_string()).collect();
        self.cmd = cmd.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add volume mount
    pub fn volume(mut self, mount: &VolumeMount) -> Self {
        self.binds.push(mount.to_string());
        self
    }
}

/// A container as reported by the runtime's list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
    pub state: Option<String>,
}

impl ContainerSummary {
    /// True only if the container's single name is exactly `/<name>`
    pub fn has_name(&self, name: &str) -> bool {
        match self.names.as_slice() {
            [only] => only.strip_prefix('/') == Some(name),
            _ => false,
        }
    }

    /// Whether the runtime reports the container as running
    pub fn is_running(&self) -> bool {
        self.state.as_deref() == Some("running")
    }
}
