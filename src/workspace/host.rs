//! Host context consumed by workspace resolution

use crate::error::Result;
use crate::terminal::{StdinProbe, TerminalProbe};
use std::path::PathBuf;

/// Location of the system local-time symlink
pub const LOCALTIME_PATH: &str = "/etc/localtime";

/// Everything about the invoking host that feeds into a workspace
#[derive(Debug, Clone)]
pub struct HostContext {
    /// Current working directory
    pub cwd: PathBuf,
    /// `$USER`, empty if unset
    pub user: String,
    /// `$HOME`, `/` if unset
    pub home: PathBuf,
    /// `$DEBEMAIL` if set
    pub debemail: Option<String>,
    /// `$DEBFULLNAME` if set
    pub debfullname: Option<String>,
    /// Numeric user id
    pub uid: u32,
    /// Numeric group id
    pub gid: u32,
    /// Local-time symlink to derive the timezone from
    pub localtime: PathBuf,
    /// Whether stdin is a terminal
    pub interactive: bool,
}

impl HostContext {
    /// Read the real host, probing stdin for a terminal
    pub fn detect() -> Result<Self> {
        Self::detect_with(&StdinProbe)
    }

    /// Read the real host with a caller-supplied terminal probe
    pub fn detect_with(probe: &impl TerminalProbe) -> Result<Self> {
        let cwd = std::env::current_dir()?;

        // SAFETY: getuid/getgid cannot fail and touch no memory.
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };

        Ok(Self {
            cwd,
            user: std::env::var("USER").unwrap_or_default(),
            home: std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/")),
            debemail: std::env::var("DEBEMAIL").ok(),
            debfullname: std::env::var("DEBFULLNAME").ok(),
            uid,
            gid,
            localtime: PathBuf::from(LOCALTIME_PATH),
            interactive: probe.is_interactive(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::FixedProbe;

    #[test]
    fn test_detect_with_probe() {
        let host = HostContext::detect_with(&FixedProbe(true)).unwrap();
        assert!(host.interactive);
        assert!(host.cwd.is_absolute());
        assert_eq!(host.localtime, PathBuf::from(LOCALTIME_PATH));

        let host = HostContext::detect_with(&FixedProbe(false)).unwrap();
        assert!(!host.interactive);
    }
}
