//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Filter comes from
/// `SQLAUDIT_LOG` (e.g. `SQLAUDIT_LOG=sqlaudit_engine=debug`), defaulting
/// to `info`. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("SQLAUDIT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
