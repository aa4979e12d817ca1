//! Build workspace resolution
//!
//! A [`Workspace`] describes one build environment: the host directory that is
//! mounted into the container, the container's name and image, and the
//! environment every containerized command runs with. It is resolved once per
//! invocation from [`WorkspaceOptions`] and the [`HostContext`] and is
//! read-only afterwards.

pub mod config;
pub mod environment;
pub mod host;

pub use config::{WorkspaceOptions, EXTRA_SOURCES_DEFAULT};
pub use host::HostContext;

use crate::container::VolumeMount;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where the workspace root is mounted inside the container
pub const MOUNT_POINT: &str = "/mnt";

/// Resolved build workspace
#[derive(Debug, Clone, Serialize)]
pub struct Workspace {
    /// Host directory mounted at [`MOUNT_POINT`]
    pub path: PathBuf,
    /// Background container name
    pub container_name: String,
    /// Image reference
    pub image: String,
    /// Debian distribution to build against
    pub distribution: String,
    /// Downstream release to build against
    pub release: String,
    /// Extra apt sources passed as `EXTRA_SOURCES`
    pub extra_sources: String,
    /// Environment for every containerized command
    pub environment: BTreeMap<String, String>,
    /// Bind mounts, workspace root first
    pub volumes: Vec<VolumeMount>,
    /// Stdin is a terminal
    pub interactive: bool,
    /// Build unstripped, unoptimized packages
    pub debug: bool,
}

impl Workspace {
    /// Resolve a workspace from raw options and the host it runs on
    pub fn resolve(options: &WorkspaceOptions, host: &HostContext) -> Result<Self> {
        let path = config::resolve_path(&options.path, &host.cwd)?;
        let container_name = config::container_name(&options.container_name, &host.user, &path)?;
        let distribution = config::or_default(&options.distribution, config::DEFAULT_DISTRIBUTION);
        let release = config::or_default(&options.release, config::DEFAULT_RELEASE);
        let image = config::image(&options.image, &distribution);

        let extra_sources = config::extra_sources(
            &options.extra_sources,
            &config::sources_files(host),
            &distribution,
            &release,
        );
        if !extra_sources.is_empty() {
            info!("Loaded extra sources:\n{}", extra_sources);
        }

        let environment =
            environment::build_environment(options.debug, options.jobs, &extra_sources, host)?;
        let volumes = environment::volumes(&path, &host.home)?;

        let workspace = Self {
            path,
            container_name,
            image,
            distribution,
            release,
            extra_sources,
            environment,
            volumes,
            interactive: host.interactive,
            debug: options.debug,
        };
        debug!("Created workspace: {:?}", workspace);
        Ok(workspace)
    }

    /// Environment as `KEY=VALUE` strings
    pub fn env_strings(&self) -> Vec<String> {
        self.environment
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect()
    }

    /// In-container location of a workspace-relative package path
    pub fn container_path(&self, package: &str) -> String {
        format!("{}/{}", MOUNT_POINT, package)
    }

    /// Host location of a workspace-relative package path
    pub fn host_path(&self, package: &str) -> PathBuf {
        self.path.join(package)
    }

    /// Pretty-printed JSON description
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
