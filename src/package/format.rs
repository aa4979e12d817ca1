//! Debian source format detection

use crate::error::{DbpError, Result};
use std::path::Path;

/// Location of the format declaration inside a package directory
pub const FORMAT_FILE: &str = "debian/source/format";

/// Value assumed when a package declares no format
pub const DEFAULT_FORMAT: &str = "1.0";

/// A package's declared source format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    /// `1.0`
    V1,
    /// `3.0 (native)`
    Native,
    /// `3.0 (quilt)`
    Quilt,
    /// `3.0 (git)`
    Git,
    /// Anything else
    Other(String),
}

impl SourceFormat {
    /// Parse a declaration, ignoring surrounding whitespace
    pub fn parse(declared: &str) -> Self {
        match declared.trim_matches(|c| c == '\n' || c == ' ' || c == '\t') {
            "1.0" => SourceFormat::V1,
            "3.0 (native)" => SourceFormat::Native,
            "3.0 (quilt)" => SourceFormat::Quilt,
            "3.0 (git)" => SourceFormat::Git,
            other => SourceFormat::Other(other.to_string()),
        }
    }

    /// Read the format of the package in `package_dir`, defaulting to `1.0`
    /// when it declares none
    pub fn read(package_dir: &Path) -> Result<Self> {
        match std::fs::read_to_string(package_dir.join(FORMAT_FILE)) {
            Ok(declared) => Ok(Self::parse(&declared)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::parse(DEFAULT_FORMAT)),
            Err(e) => Err(DbpError::SourceFormat(e)),
        }
    }

    /// Tool that builds packages of this format
    pub fn build_tool(&self) -> BuildTool {
        match self {
            SourceFormat::Git => BuildTool::Debuild,
            SourceFormat::V1
            | SourceFormat::Native
            | SourceFormat::Quilt
            | SourceFormat::Other(_) => BuildTool::GbpBuildpackage,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::V1 => write!(f, "1.0"),
            SourceFormat::Native => write!(f, "3.0 (native)"),
            SourceFormat::Quilt => write!(f, "3.0 (quilt)"),
            SourceFormat::Git => write!(f, "3.0 (git)"),
            SourceFormat::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Package build command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTool {
    /// `debuild`
    Debuild,
    /// `gbp buildpackage`
    GbpBuildpackage,
}

impl BuildTool {
    /// Command tokens to run in the package directory
    pub fn command(&self) -> Vec<String> {
        let tokens: &[&str] = match self {
            BuildTool::Debuild => &["debuild"],
            BuildTool::GbpBuildpackage => &["gbp", "buildpackage"],
        };
        tokens.iter().map(|s| s.to_string()).collect()
    }
}

impl std::fmt::Display for BuildTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command().join(" "))
    }
}
