//! Logging setup shared by the daemon and the client subcommands.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the stderr subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_level`
/// (e.g. "info" for the daemon, "warn" for one-shot client calls).
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}
