//! Package builds
//!
//! Packages are directories relative to the workspace root. Each one is built
//! in turn inside the workspace container with the tool its source format
//! calls for. The first failure ends the run.

pub mod format;

pub use format::{BuildTool, SourceFormat};

use crate::container::{Dispatcher, DockerCli};
use crate::error::{DbpError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Split extra `gbp buildpackage` options the way a shell would
pub fn parse_gbp_options(raw: &str) -> Result<Vec<String>> {
    shlex::split(raw).ok_or_else(|| DbpError::GbpOptions(raw.to_string()))
}

/// Builds workspace packages through a [`Dispatcher`]
pub struct PackageBuilder<'a, C> {
    dispatcher: &'a Dispatcher<'a, C>,
    cwd: PathBuf,
    gbp_options: Vec<String>,
}

impl<'a, C: DockerCli> PackageBuilder<'a, C> {
    /// `cwd` names the package built when none is requested
    pub fn new(dispatcher: &'a Dispatcher<'a, C>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            dispatcher,
            cwd: cwd.into(),
            gbp_options: Vec::new(),
        }
    }

    /// Extra options appended to every `gbp buildpackage` run
    pub fn gbp_options(mut self, options: Vec<String>) -> Self {
        self.gbp_options = options;
        self
    }

    /// Build `packages` in order, or the package in the current directory
    /// when the list is empty. Stops at the first failure and reports which
    /// package it was.
    pub fn build_all(&self, packages: &[String]) -> Result<()> {
        let default;
        let packages = if packages.is_empty() {
            default = [self.current_package()];
            &default[..]
        } else {
            packages
        };

        for package in packages {
            self.build(package).map_err(|e| e.in_package(package))?;
        }
        Ok(())
    }

    /// Build a single workspace-relative package
    pub fn build(&self, package: &str) -> Result<()> {
        if Path::new(package).is_absolute() {
            return Err(DbpError::AbsolutePackagePath);
        }

        let workspace = self.dispatcher.workspace();
        let host_path = workspace.host_path(package);
        if !host_path.exists() {
            return Err(DbpError::PackageNotFound(host_path));
        }

        let format = SourceFormat::read(&host_path)?;
        let tool = format.build_tool();
        info!("Building {} ({}) with {}", package, format, tool);

        let mut command = tool.command();
        if tool == BuildTool::GbpBuildpackage {
            command.extend(self.gbp_options.iter().cloned());
        }

        if self
            .dispatcher
            .exec(&command, &workspace.container_path(package))
        {
            Ok(())
        } else {
            Err(DbpError::BuildFailed)
        }
    }

    fn current_package(&self) -> String {
        self.cwd
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
