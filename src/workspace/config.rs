//! Workspace configuration resolution
//!
//! Turns the raw command-line inputs into the concrete values a workspace is
//! built from: the mounted directory, container name, image and the apt
//! sources injected into the container.

use super::host::HostContext;
use crate::error::{DbpError, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Debian distribution used when none is given
pub const DEFAULT_DISTRIBUTION: &str = "stretch";

/// Downstream release used when none is given
pub const DEFAULT_RELEASE: &str = "unstable";

/// Base image the default image reference is derived from
pub const BASE_IMAGE: &str = "opxhub/gbp:v2.0.5";

/// Extra-sources value requesting file lookup and the generated default
pub const EXTRA_SOURCES_DEFAULT: &str = "DEFAULT";

/// Project-local sources file, relative to the current directory
pub const LOCAL_SOURCES_FILE: &str = "extra_sources.list";

/// Per-user sources file, relative to `$HOME`
pub const HOME_SOURCES_FILE: &str = ".extra_sources.list";

/// Version-control metadata directory marking a project checkout
const VCS_DIR: &str = ".git";

/// Raw inputs to workspace resolution. Empty strings mean "not given".
#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    /// Build unstripped, unoptimized packages
    pub debug: bool,
    /// Workspace location
    pub path: String,
    /// Container name override
    pub container_name: String,
    /// Image override
    pub image: String,
    /// Distribution override
    pub distribution: String,
    /// Release override
    pub release: String,
    /// Extra apt sources, or [`EXTRA_SOURCES_DEFAULT`]
    pub extra_sources: String,
    /// Parallel build jobs passed through `DEB_BUILD_OPTIONS`
    pub jobs: Option<u32>,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            debug: false,
            path: String::new(),
            container_name: String::new(),
            image: String::new(),
            distribution: String::new(),
            release: String::new(),
            extra_sources: EXTRA_SOURCES_DEFAULT.to_string(),
            jobs: None,
        }
    }
}

/// Resolve the directory to mount.
///
/// Relative paths are taken from `cwd` and cleaned lexically. When the result
/// is itself a git checkout its parent is used instead, one level only.
pub fn resolve_path(raw: &str, cwd: &Path) -> Result<PathBuf> {
    let path = absolutize(Path::new(raw), cwd);

    let metadata = std::fs::metadata(&path).map_err(|source| DbpError::WorkspacePath {
        path: path.clone(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(DbpError::WorkspacePath {
            path,
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    let vcs_dir = path.join(VCS_DIR);
    let is_checkout = vcs_dir
        .try_exists()
        .map_err(|source| DbpError::Stat {
            path: vcs_dir,
            source,
        })?;

    if is_checkout {
        if let Some(parent) = path.parent() {
            return Ok(parent.to_path_buf());
        }
    }
    Ok(path)
}

/// Join `path` onto `cwd` and drop `.`/`..` components without touching the
/// filesystem.
fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut clean = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other.as_os_str()),
        }
    }
    clean
}

/// Pick the container name: the override, or `<user>-dbp-<dir>`.
pub fn container_name(name: &str, user: &str, path: &Path) -> Result<String> {
    let name = if name.is_empty() {
        let base = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}-dbp-{}", user, base)
    } else {
        name.to_string()
    };

    if !is_valid_container_name(&name) {
        return Err(DbpError::InvalidContainerName(name));
    }
    Ok(name)
}

/// Docker accepts `[a-zA-Z0-9][a-zA-Z0-9_.-]+`
pub fn is_valid_container_name(name: &str) -> bool {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| regex::Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]+$").unwrap())
        .is_match(name)
}

/// `value` unless it is empty
pub fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// The image override, or the development image for `distribution`
pub fn image(image: &str, distribution: &str) -> String {
    if image.is_empty() {
        format!("{}-{}-dev", BASE_IMAGE, distribution)
    } else {
        image.to_string()
    }
}

/// Sources files searched when no explicit sources are given, in order
pub fn sources_files(host: &HostContext) -> Vec<PathBuf> {
    vec![
        host.cwd.join(LOCAL_SOURCES_FILE),
        host.home.join(HOME_SOURCES_FILE),
    ]
}

/// The generated apt source line for a distribution and release
pub fn default_sources(distribution: &str, release: &str) -> String {
    format!(
        "deb http://deb.openswitch.net/{} {} opx opx-non-free",
        distribution, release
    )
}

/// Resolve the extra apt sources.
///
/// Anything other than [`EXTRA_SOURCES_DEFAULT`] is used verbatim, including
/// the empty string. Otherwise the first readable file in `files` wins, and
/// failing that the generated default line.
pub fn extra_sources(requested: &str, files: &[PathBuf], distribution: &str, release: &str) -> String {
    if requested != EXTRA_SOURCES_DEFAULT {
        return requested.to_string();
    }

    for file in files {
        match std::fs::read_to_string(file) {
            Ok(content) => {
                tracing::debug!("Using extra sources from {}", file.display());
                return content;
            }
            Err(e) => tracing::trace!("Skipping {}: {}", file.display(), e),
        }
    }

    default_sources(distribution, release)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn host(cwd: &Path, home: &Path) -> HostContext {
        HostContext {
            cwd: cwd.to_path_buf(),
            user: "alice".to_string(),
            home: home.to_path_buf(),
            debemail: None,
            debfullname: None,
            uid: 1000,
            gid: 1000,
            localtime: PathBuf::from("/nonexistent/localtime"),
            interactive: false,
        }
    }

    #[test]
    fn test_resolve_path_uses_parent_of_checkout() {
        let temp = tempdir().unwrap();
        let project = temp.path().join("opx-logging");
        std::fs::create_dir_all(project.join(".git")).unwrap();

        let resolved = resolve_path(project.to_str().unwrap(), Path::new("/")).unwrap();
        assert_eq!(resolved, temp.path());

        // the parent has no .git, so it resolves to itself
        let again = resolve_path(resolved.to_str().unwrap(), Path::new("/")).unwrap();
        assert_eq!(again, resolved);
    }

    #[test]
    fn test_resolve_path_only_one_level() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let project = temp.path().join("pkg");
        std::fs::create_dir_all(project.join(".git")).unwrap();

        let resolved = resolve_path(project.to_str().unwrap(), Path::new("/")).unwrap();
        assert_eq!(resolved, temp.path());
    }

    #[test]
    fn test_resolve_path_relative_and_empty() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("ws")).unwrap();

        assert_eq!(resolve_path("", temp.path()).unwrap(), temp.path());
        assert_eq!(
            resolve_path("./ws/../ws", temp.path()).unwrap(),
            temp.path().join("ws")
        );
    }

    #[test]
    fn test_resolve_path_missing_directory() {
        let temp = tempdir().unwrap();
        let result = resolve_path("does-not-exist", temp.path());
        assert!(matches!(result, Err(DbpError::WorkspacePath { .. })));

        std::fs::write(temp.path().join("file"), "").unwrap();
        let result = resolve_path("file", temp.path());
        assert!(matches!(result, Err(DbpError::WorkspacePath { .. })));
    }

    #[test]
    fn test_container_name() {
        let path = Path::new("/home/alice/src");
        assert_eq!(container_name("", "alice", path).unwrap(), "alice-dbp-src");
        assert_eq!(container_name("custom", "alice", path).unwrap(), "custom");
        assert!(matches!(
            container_name("bad name", "alice", path),
            Err(DbpError::InvalidContainerName(_))
        ));
        assert!(container_name("", "", path).is_err());
    }

    #[test]
    fn test_container_name_validation() {
        assert!(is_valid_container_name("alice-dbp-src"));
        assert!(is_valid_container_name("a.b_c-1"));
        assert!(!is_valid_container_name(""));
        assert!(!is_valid_container_name("a"));
        assert!(!is_valid_container_name("-leading"));
        assert!(!is_valid_container_name("has/slash"));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(or_default("", DEFAULT_DISTRIBUTION), "stretch");
        assert_eq!(or_default("buster", DEFAULT_DISTRIBUTION), "buster");
        assert_eq!(image("", "buster"), "opxhub/gbp:v2.0.5-buster-dev");
        assert_eq!(image("debian:sid", "buster"), "debian:sid");
    }

    #[test]
    fn test_extra_sources_override_wins() {
        let temp = tempdir().unwrap();
        let h = host(temp.path(), temp.path());
        std::fs::write(temp.path().join(LOCAL_SOURCES_FILE), "deb local").unwrap();
        let files = sources_files(&h);

        assert_eq!(extra_sources("", &files, "stretch", "unstable"), "");
        assert_eq!(
            extra_sources("deb http://x y z", &files, "stretch", "unstable"),
            "deb http://x y z"
        );
    }

    #[test]
    fn test_extra_sources_file_precedence() {
        let cwd = tempdir().unwrap();
        let home = tempdir().unwrap();
        let h = host(cwd.path(), home.path());
        let files = sources_files(&h);

        assert_eq!(
            extra_sources(EXTRA_SOURCES_DEFAULT, &files, "stretch", "unstable"),
            "deb http://deb.openswitch.net/stretch unstable opx opx-non-free"
        );

        std::fs::write(home.path().join(HOME_SOURCES_FILE), "deb home").unwrap();
        assert_eq!(
            extra_sources(EXTRA_SOURCES_DEFAULT, &files, "stretch", "unstable"),
            "deb home"
        );

        std::fs::write(cwd.path().join(LOCAL_SOURCES_FILE), "deb local").unwrap();
        assert_eq!(
            extra_sources(EXTRA_SOURCES_DEFAULT, &files, "stretch", "unstable"),
            "deb local"
        );
    }
}
