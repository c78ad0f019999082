//! Tracing initialization for binaries, tests, and benches.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, filtered by `CALIBRA_LOG`
/// (falling back to `info`). Later calls are no-ops, so tests can call
/// this freely.
pub fn init() {
    let filter =
        EnvFilter::try_from_env("CALIBRA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
