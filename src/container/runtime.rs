//! Container runtime implementation
//!
//! [`ContainerRuntime`] is the slice of the Docker Engine API the lifecycle
//! manager needs. [`DockerRuntime`] implements it on top of `bollard`.

use super::config::{ContainerSpec, ContainerSummary};
use crate::error::{DbpError, Result};
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    StartContainerOptions,
};
use bollard::image::{CreateImageOptions, ListImagesOptions};
use bollard::models::HostConfig;
use bollard::Docker;
use futures_util::TryStreamExt;

/// Operations on the container runtime
#[allow(async_fn_in_trait)]
pub trait ContainerRuntime {
    /// List containers in every state
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>>;

    /// Repository tags of all local images
    async fn image_tags(&self) -> Result<Vec<String>>;

    /// Pull an image, waiting for the transfer to finish
    async fn pull_image(&self, reference: &str) -> Result<()>;

    /// Create a container, returning its ID
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start a created container
    async fn start_container(&self, id: &str) -> Result<()>;

    /// Remove a container even if it is running
    async fn remove_container(&self, id: &str) -> Result<()>;
}

/// Docker Engine API client
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect using `DOCKER_HOST` or the platform's default socket
    pub fn connect() -> Result<Self> {
        let docker =
            Docker::connect_with_local_defaults().map_err(DbpError::docker("connecting to docker"))?;
        Ok(Self { docker })
    }
}

impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(DbpError::docker("listing containers"))?;

        Ok(containers
            .into_iter()
            .map(|c| ContainerSummary {
                id: c.id.unwrap_or_default(),
                names: c.names.unwrap_or_default(),
                state: c.state.map(|s| s.to_string()),
            })
            .collect())
    }

    async fn image_tags(&self) -> Result<Vec<String>> {
        let images = self
            .docker
            .list_images(Some(ListImagesOptions::<String>::default()))
            .await
            .map_err(DbpError::docker("listing images"))?;

        Ok(images.into_iter().flat_map(|image| image.repo_tags).collect())
    }

    async fn pull_image(&self, reference: &str) -> Result<()> {
        let options = CreateImageOptions {
            from_image: reference,
            ..Default::default()
        };
        self.docker
            .create_image(Some(options), None, None)
            .try_for_each(|progress| async move {
                tracing::trace!("{:?}", progress);
                Ok(())
            })
            .await
            .map_err(DbpError::docker("pulling image"))
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let options = CreateContainerOptions {
            name: spec.name.as_str(),
            platform: None,
        };
        let config = Config {
            hostname: Some(spec.hostname.clone()),
            tty: Some(spec.tty),
            open_stdin: Some(spec.open_stdin),
            env: Some(spec.env.clone()),
            cmd: Some(spec.cmd.clone()),
            image: Some(spec.image.clone()),
            entrypoint: Some(spec.entrypoint.clone()),
            host_config: Some(HostConfig {
                binds: Some(spec.binds.clone()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let response = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(DbpError::docker("creating container"))?;
        for warning in &response.warnings {
            tracing::warn!("{}", warning);
        }
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(DbpError::docker("starting container"))
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        self.docker
            .remove_container(id, Some(options))
            .await
            .map_err(DbpError::docker("removing container"))
    }
}
