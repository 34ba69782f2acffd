//! Process-wide `tracing` setup.

use tracing_subscriber::EnvFilter;

/// Installs a formatted `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_directive` (for example
/// `"info"` or `"scribble_room=debug,info"`). Returns `false` if a global
/// subscriber was already installed, which makes it safe to call from
/// tests.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
