//! Process liveness probes used by the watchers.
//!
//! Two strategies are available and neither is assumed to behave the same on
//! every platform:
//! - [`SignalProbe`] sends the null signal (`kill(pid, 0)`). Works on any Unix,
//!   but needs permission to signal the target.
//! - [`ProcTableProbe`] checks for a `/proc/<pid>` entry. Linux only in
//!   practice, needs no permissions.
//!
//! Both are best effort: pids are reused by the kernel, so a dead owner may be
//! reported alive for a while. That only delays reclamation.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Result of a single liveness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
    /// The probe itself failed (e.g. permission denied).
    Unknown(String),
}

/// "Is process P alive" capability.
pub trait LivenessProbe: Send + Sync + fmt::Debug {
    fn probe(&self, pid: u32) -> Liveness;
}

/// Probes with the null signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalProbe;

impl LivenessProbe for SignalProbe {
    fn probe(&self, pid: u32) -> Liveness {
        // Non-positive values would address process groups.
        let raw = match i32::try_from(pid) {
            Ok(raw) if raw > 0 => raw,
            _ => return Liveness::Dead,
        };

        match kill(Pid::from_raw(raw), None) {
            Ok(()) => Liveness::Alive,
            Err(Errno::ESRCH) => Liveness::Dead,
            Err(e) => Liveness::Unknown(e.to_string()),
        }
    }
}

/// Probes for a process-table entry under `root` (normally `/proc`).
#[derive(Debug, Clone)]
pub struct ProcTableProbe {
    root: PathBuf,
}

impl ProcTableProbe {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for ProcTableProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessProbe for ProcTableProbe {
    fn probe(&self, pid: u32) -> Liveness {
        if pid == 0 {
            return Liveness::Dead;
        }

        match std::fs::metadata(self.root.join(pid.to_string())) {
            Ok(_) => Liveness::Alive,
            Err(e) if e.kind() == ErrorKind::NotFound => Liveness::Dead,
            Err(e) => Liveness::Unknown(e.to_string()),
        }
    }
}

/// Which probe the daemon uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ProbeKind {
    #[default]
    Signal,
    Proc,
}

impl ProbeKind {
    pub fn probe(self) -> Arc<dyn LivenessProbe> {
        match self {
            ProbeKind::Signal => Arc::new(SignalProbe),
            ProbeKind::Proc => Arc::new(ProcTableProbe::new()),
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Signal => write!(f, "signal"),
            ProbeKind::Proc => write!(f, "proc"),
        }
    }
}
