//! dbp - Debian build workspaces in Docker
//!
//! dbp keeps a long-lived Docker container per source tree and runs package
//! builds and shells inside it:
//!
//! - Workspace resolution (mount path, container name, image, apt sources)
//! - Container lifecycle through the Docker Engine API
//! - Command dispatch with the caller's terminal attached
//! - Source-format aware package builds

pub mod container;
pub mod error;
pub mod package;
pub mod terminal;
pub mod workspace;

pub use error::{DbpError, Result};
pub use workspace::{HostContext, Workspace, WorkspaceOptions};
