//! Shared observability setup (tracing/logging).

/// Initialize process-wide observability.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing subscriber configuration.
pub mod tracing;
