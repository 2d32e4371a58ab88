//! Daemon and client configuration.
//!
//! Every tunable can come from a CLI flag, an environment variable, or a
//! default, in that order of precedence.

use crate::glod_paths;
use crate::store::{LivenessProbe, ProbeKind};
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Overrides the socket path.
pub const SOCKET_ENV: &str = "GLOD_SOCKET";
/// Watcher polling interval in milliseconds.
pub const POLL_INTERVAL_ENV: &str = "GLOD_POLL_INTERVAL_MS";
/// Liveness probe: `signal` or `proc`.
pub const PROBE_ENV: &str = "GLOD_LIVENESS_PROBE";
/// Client request timeout in milliseconds.
pub const REQUEST_TIMEOUT_ENV: &str = "GLOD_REQUEST_TIMEOUT_MS";

const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2000;

/// Store settings: how watchers poll and what they poll with.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub poll_interval: Duration,
    pub probe: Arc<dyn LivenessProbe>,
}

impl StoreConfig {
    /// A zero `poll_interval` falls back to the 100ms default.
    pub fn new(poll_interval: Duration, probe: Arc<dyn LivenessProbe>) -> Self {
        Self {
            poll_interval: if poll_interval.is_zero() {
                Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
            } else {
                poll_interval
            },
            probe,
        }
    }

    /// Resolves the store settings from flags, then environment, then defaults.
    pub fn resolve(probe: Option<ProbeKind>, poll_interval_ms: Option<u64>) -> Self {
        Self::new(
            poll_interval(poll_interval_ms),
            probe_kind(probe).probe(),
        )
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            ProbeKind::default().probe(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub socket_path: PathBuf,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn resolve(socket: Option<PathBuf>) -> Self {
        Self {
            socket_path: socket_path(socket),
            request_timeout: env_millis(REQUEST_TIMEOUT_ENV)
                .unwrap_or(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)),
        }
    }
}

/// Socket path from flag, `GLOD_SOCKET`, or the per-user runtime directory.
pub fn socket_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        std::env::var_os(SOCKET_ENV)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(glod_paths::default_socket_path)
}

/// Polling interval from flag, `GLOD_POLL_INTERVAL_MS`, or 100ms. Zero is
/// ignored.
pub fn poll_interval(flag_ms: Option<u64>) -> Duration {
    flag_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .or_else(|| env_millis(POLL_INTERVAL_ENV))
        .unwrap_or(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
}

/// Probe from flag, `GLOD_LIVENESS_PROBE`, or the signal probe.
pub fn probe_kind(flag: Option<ProbeKind>) -> ProbeKind {
    flag.or_else(|| {
        std::env::var(PROBE_ENV)
            .ok()
            .and_then(|s| ProbeKind::from_str(s.trim(), true).ok())
    })
    .unwrap_or_default()
}

fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
