//! Container lifecycle management

use super::config::{ContainerSpec, ContainerSummary};
use super::runtime::ContainerRuntime;
use crate::error::Result;
use crate::workspace::Workspace;
use tracing::{debug, error, info, warn};

/// Shell the container idles in between exec sessions
const ENTRYPOINT: &[&str] = &["bash"];
const ENTRYPOINT_CMD: &[&str] = &["-l"];

/// Manages the background container belonging to a workspace
pub struct ContainerManager<'a, R> {
    workspace: &'a Workspace,
    runtime: R,
}

impl<'a, R: ContainerRuntime> ContainerManager<'a, R> {
    /// Create a manager owning the runtime client
    pub fn new(workspace: &'a Workspace, runtime: R) -> Self {
        Self { workspace, runtime }
    }

    /// The underlying runtime client
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Ensure the workspace container exists and is started.
    ///
    /// Returns `true` if a container with the workspace's name already
    /// existed, in which case nothing is changed. Otherwise the image is
    /// pulled when missing (or when `force_pull` is set), and a new container
    /// is created and started.
    pub async fn ensure_running(&self, force_pull: bool) -> Result<bool> {
        if let Some(existing) = self.find().await? {
            if !existing.is_running() {
                warn!(
                    "Container {} exists but is {}",
                    self.workspace.container_name,
                    existing.state.as_deref().unwrap_or("in an unknown state")
                );
            }
            return Ok(true);
        }

        let have_image = self
            .runtime
            .image_tags()
            .await?
            .iter()
            .any(|tag| *tag == self.workspace.image);
        if force_pull || !have_image {
            self.pull_image().await?;
        }

        debug!("Running container {}...", self.workspace.container_name);
        let id = self.runtime.create_container(&self.container_spec()).await?;

        debug!("Starting container {}...", self.workspace.container_name);
        if let Err(e) = self.runtime.start_container(&id).await {
            if let Err(remove_err) = self.runtime.remove_container(&id).await {
                error!("{}", remove_err);
            }
            return Err(e);
        }

        Ok(false)
    }

    /// Force-remove the workspace container. A missing container is not an
    /// error.
    pub async fn remove(&self) -> Result<()> {
        match self.find().await? {
            Some(container) => {
                debug!("Removing container {}...", self.workspace.container_name);
                self.runtime.remove_container(&container.id).await
            }
            None => {
                debug!("Container {} does not exist", self.workspace.container_name);
                Ok(())
            }
        }
    }

    /// Run `action` with the container up, removing the container afterwards
    /// if this call was the one that created it. Removal happens before the
    /// action's result is returned, including on failure.
    pub async fn with_container<T>(
        &self,
        force_pull: bool,
        action: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let already_running = self.ensure_running(force_pull).await?;
        let result = action();

        if !already_running {
            if let Err(e) = self.remove().await {
                if let Err(action_err) = &result {
                    error!("{}", action_err);
                }
                return Err(e);
            }
        }
        result
    }

    /// Pull the workspace image
    pub async fn pull_image(&self) -> Result<()> {
        info!("Pulling image {}...", self.workspace.image);
        self.runtime.pull_image(&self.workspace.image).await
    }

    /// Creation parameters for the workspace container
    pub fn container_spec(&self) -> ContainerSpec {
        let ws = self.workspace;
        let mut spec = ContainerSpec::new(&ws.container_name, &ws.image)
            .hostname(&ws.distribution)
            .tty(true)
            .open_stdin(ws.interactive)
            .entrypoint(ENTRYPOINT, ENTRYPOINT_CMD);
        for (key, value) in &ws.environment {
            spec = spec.env(key, value);
        }
        for volume in &ws.volumes {
            spec = spec.volume(volume);
        }
        spec
    }

    async fn find(&self) -> Result<Option<ContainerSummary>> {
        let containers = self.runtime.list_containers().await?;
        Ok(containers
            .into_iter()
            .find(|c| c.has_name(&self.workspace.container_name)))
    }
}
