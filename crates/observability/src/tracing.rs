//! Tracing subscriber configuration.

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber: JSON lines on stdout, filtered via
/// `RUST_LOG` (default `info`).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}
