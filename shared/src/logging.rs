//! Tracing setup shared by every component and test harness

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// An explicit `level` overrides `RUST_LOG`; without either, "info" is used.
/// Safe to call more than once (later calls are no-ops), so every test can
/// invoke it without coordination.
pub fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();

    if initialized {
        tracing::debug!("tracing initialized");
    }
}
