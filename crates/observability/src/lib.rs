//! `workaccess-observability` — process-wide tracing/logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize JSON tracing for the process.
///
/// The filter comes from `RUST_LOG` and defaults to `info`, which keeps the
/// per-request HTTP trace spans visible without debug noise. Safe to call
/// more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}
