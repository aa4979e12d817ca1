//! Terminal capability probing
//!
//! Exec sessions only attach stdin when the invoking process is connected to
//! a terminal. The check is a `tcgetattr`-style query on stdin, performed the
//! native way for each platform family.

/// Answers whether the current process is attached to a terminal.
pub trait TerminalProbe {
    fn is_interactive(&self) -> bool;
}

/// Probes the process's standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinProbe;

#[cfg(any(target_os = "linux", target_os = "android"))]
impl TerminalProbe for StdinProbe {
    fn is_interactive(&self) -> bool {
        let mut termios = std::mem::MaybeUninit::<libc::termios>::uninit();
        // SAFETY: TCGETS writes at most one termios into the provided buffer.
        unsafe { libc::ioctl(libc::STDIN_FILENO, libc::TCGETS, termios.as_mut_ptr()) == 0 }
    }
}

#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
impl TerminalProbe for StdinProbe {
    fn is_interactive(&self) -> bool {
        let mut termios = std::mem::MaybeUninit::<libc::termios>::uninit();
        // SAFETY: tcgetattr writes at most one termios into the provided buffer.
        unsafe { libc::tcgetattr(libc::STDIN_FILENO, termios.as_mut_ptr()) == 0 }
    }
}

#[cfg(not(unix))]
impl TerminalProbe for StdinProbe {
    fn is_interactive(&self) -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal()
    }
}

/// A probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub bool);

impl TerminalProbe for FixedProbe {
    fn is_interactive(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_probe() {
        assert!(FixedProbe(true).is_interactive());
        assert!(!FixedProbe(false).is_interactive());
    }

    #[test]
    fn test_stdin_probe_matches_std() {
        use std::io::IsTerminal;
        assert_eq!(
            StdinProbe.is_interactive(),
            std::io::stdin().is_terminal()
        );
    }
}
