//! Container management module
//!
//! This module drives the Docker container backing a workspace: creating and
//! removing it through the Engine API, and running commands inside it.

pub mod config;
pub mod exec;
pub mod lifecycle;
pub mod runtime;

pub use config::{ContainerSpec, ContainerSummary, VolumeMount};
pub use exec::{ensure_docker_cli, Dispatcher, DockerCli, SystemDocker};
pub use lifecycle::ContainerManager;
pub use runtime::{ContainerRuntime, DockerRuntime};
