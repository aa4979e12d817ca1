//! Error types for dbp

use std::path::PathBuf;
use thiserror::Error;

/// Result type for dbp operations
pub type Result<T> = std::result::Result<T, DbpError>;

/// dbp error types
#[derive(Error, Debug)]
pub enum DbpError {
    #[error("Invalid workspace path {path}: {source}")]
    WorkspacePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stat on {path} failed: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resolving localtime symlink {path}: {source}")]
    Timezone {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid container name: {0:?}")]
    InvalidContainerName(String),

    #[error("Path must be relative to workspace")]
    AbsolutePackagePath,

    #[error("Path {0} does not exist in workspace")]
    PackageNotFound(PathBuf),

    #[error("Reading debian source format failed: {0}")]
    SourceFormat(#[source] std::io::Error),

    #[error("Package build failed")]
    BuildFailed,

    #[error("{package}: {source}")]
    Package {
        package: String,
        #[source]
        source: Box<DbpError>,
    },

    #[error("{op}: {source}")]
    Docker {
        op: &'static str,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("Invalid git-buildpackage options: {0:?}")]
    GbpOptions(String),

    #[error("Docker not found in PATH. Please install docker.")]
    DockerCliMissing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbpError {
    /// Wrap a Docker API error with the operation that produced it
    pub fn docker(op: &'static str) -> impl FnOnce(bollard::errors::Error) -> Self {
        move |source| DbpError::Docker { op, source }
    }

    /// Tag an error with the package path it occurred on
    pub fn in_package(self, package: &str) -> Self {
        DbpError::Package {
            package: package.to_string(),
            source: Box::new(self),
        }
    }
}
