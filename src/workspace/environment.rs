//! Container environment and volume mounts

use super::host::HostContext;
use super::MOUNT_POINT;
use crate::container::VolumeMount;
use crate::error::{DbpError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// `DEB_BUILD_OPTIONS` for unstripped, unoptimized packages
pub const DEBUG_BUILD_OPTIONS: &str = "nostrip noopt debug";

/// Maintainer email used when `$DEBEMAIL` is unset
pub const DEFAULT_DEBEMAIL: &str = "ops-dev@lists.openswitch.net";

/// Maintainer name used when `$DEBFULLNAME` is unset
pub const DEFAULT_DEBFULLNAME: &str = "Dell EMC";

/// Where the host's git configuration appears in the container
pub const GITCONFIG_MOUNT: &str = "/etc/skel/.gitconfig";

/// Assemble `DEB_BUILD_OPTIONS`
pub fn build_options(debug: bool, jobs: Option<u32>) -> String {
    let mut options = Vec::new();
    if debug {
        options.push(DEBUG_BUILD_OPTIONS.to_string());
    }
    if let Some(jobs) = jobs {
        options.push(format!("parallel={}", jobs));
    }
    options.join(" ")
}

/// Keep the last two segments of a resolved zoneinfo path.
///
/// `/usr/share/zoneinfo/America/Los_Angeles` becomes `America/Los_Angeles`.
/// Anything without two segments is returned as is.
pub fn timezone_name(resolved: &str) -> String {
    let parts: Vec<&str> = resolved.split('/').collect();
    match parts.as_slice() {
        [.., region, city] => format!("{}/{}", region, city),
        _ => resolved.to_string(),
    }
}

/// Resolve the local-time symlink and derive an IANA zone name from it
pub fn timezone(localtime: &Path) -> Result<String> {
    let resolved = std::fs::canonicalize(localtime).map_err(|source| DbpError::Timezone {
        path: localtime.to_path_buf(),
        source,
    })?;
    Ok(timezone_name(&resolved.to_string_lossy()))
}

/// Build the environment injected into every containerized command
pub fn build_environment(
    debug: bool,
    jobs: Option<u32>,
    extra_sources: &str,
    host: &HostContext,
) -> Result<BTreeMap<String, String>> {
    let tz = timezone(&host.localtime)?;

    let mut env = BTreeMap::new();
    env.insert("DEB_BUILD_OPTIONS".to_string(), build_options(debug, jobs));
    env.insert(
        "DEBEMAIL".to_string(),
        host.debemail
            .clone()
            .unwrap_or_else(|| DEFAULT_DEBEMAIL.to_string()),
    );
    env.insert(
        "DEBFULLNAME".to_string(),
        host.debfullname
            .clone()
            .unwrap_or_else(|| DEFAULT_DEBFULLNAME.to_string()),
    );
    env.insert("EXTRA_SOURCES".to_string(), extra_sources.to_string());
    env.insert("GID".to_string(), host.gid.to_string());
    env.insert("TZ".to_string(), tz);
    env.insert("UID".to_string(), host.uid.to_string());
    Ok(env)
}

/// Bind mounts: the workspace at [`MOUNT_POINT`], plus `~/.gitconfig`
/// read-only when present
pub fn volumes(path: &Path, home: &Path) -> Result<Vec<VolumeMount>> {
    let mut volumes = vec![VolumeMount::read_write(path, MOUNT_POINT)];

    let gitconfig: PathBuf = home.join(".gitconfig");
    let present = gitconfig.try_exists().map_err(|source| DbpError::Stat {
        path: gitconfig.clone(),
        source,
    })?;
    if present {
        volumes.push(VolumeMount::read_only(gitconfig, GITCONFIG_MOUNT));
    }

    Ok(volumes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn host(home: &Path, localtime: PathBuf) -> HostContext {
        HostContext {
            cwd: home.to_path_buf(),
            user: "alice".to_string(),
            home: home.to_path_buf(),
            debemail: None,
            debfullname: None,
            uid: 1000,
            gid: 100,
            localtime,
            interactive: false,
        }
    }

    #[test]
    fn test_timezone_name() {
        assert_eq!(
            timezone_name("/usr/share/zoneinfo/America/Los_Angeles"),
            "America/Los_Angeles"
        );
        assert_eq!(timezone_name("/usr/share/zoneinfo/UTC"), "zoneinfo/UTC");
        assert_eq!(timezone_name("UTC"), "UTC");
        assert_eq!(timezone_name("/UTC"), "/UTC");
    }

    #[cfg(unix)]
    #[test]
    fn test_timezone_follows_symlink() {
        let temp = tempdir().unwrap();
        let zone = temp.path().join("zoneinfo/Europe");
        std::fs::create_dir_all(&zone).unwrap();
        std::fs::write(zone.join("Berlin"), "TZif").unwrap();
        let link = temp.path().join("localtime");
        std::os::unix::fs::symlink(zone.join("Berlin"), &link).unwrap();

        assert_eq!(timezone(&link).unwrap(), "Europe/Berlin");
    }

    #[test]
    fn test_timezone_missing_symlink() {
        let temp = tempdir().unwrap();
        let result = timezone(&temp.path().join("localtime"));
        assert!(matches!(result, Err(DbpError::Timezone { .. })));
    }

    #[test]
    fn test_build_options() {
        assert_eq!(build_options(false, None), "");
        assert_eq!(build_options(true, None), "nostrip noopt debug");
        assert_eq!(build_options(false, Some(5)), "parallel=5");
        assert_eq!(build_options(true, Some(5)), "nostrip noopt debug parallel=5");
    }

    #[test]
    fn test_build_environment() {
        let temp = tempdir().unwrap();
        let localtime = temp.path().join("Etc/UTC");
        std::fs::create_dir_all(localtime.parent().unwrap()).unwrap();
        std::fs::write(&localtime, "TZif").unwrap();

        let mut h = host(temp.path(), localtime);
        let env = build_environment(false, None, "", &h).unwrap();
        assert_eq!(env["DEB_BUILD_OPTIONS"], "");
        assert_eq!(env["DEBEMAIL"], DEFAULT_DEBEMAIL);
        assert_eq!(env["DEBFULLNAME"], DEFAULT_DEBFULLNAME);
        assert_eq!(env["EXTRA_SOURCES"], "");
        assert_eq!(env["UID"], "1000");
        assert_eq!(env["GID"], "100");
        assert_eq!(env["TZ"], "Etc/UTC");

        h.debemail = Some("alice@example.com".to_string());
        h.debfullname = Some(String::new());
        let env = build_environment(true, None, "deb x y", &h).unwrap();
        assert_eq!(env["DEB_BUILD_OPTIONS"], DEBUG_BUILD_OPTIONS);
        assert_eq!(env["DEBEMAIL"], "alice@example.com");
        assert_eq!(env["DEBFULLNAME"], "");
        assert_eq!(env["EXTRA_SOURCES"], "deb x y");
    }

    #[test]
    fn test_volumes_with_and_without_gitconfig() {
        let ws = tempdir().unwrap();
        let home = tempdir().unwrap();

        let mounts = volumes(ws.path(), home.path()).unwrap();
        assert_eq!(mounts, vec![VolumeMount::read_write(ws.path(), "/mnt")]);

        std::fs::write(home.path().join(".gitconfig"), "[user]\n").unwrap();
        let mounts = volumes(ws.path(), home.path()).unwrap();
        assert_eq!(mounts.len(), 2);
        assert_eq!(
            mounts[1],
            VolumeMount::read_only(home.path().join(".gitconfig"), GITCONFIG_MOUNT)
        );
    }
}
