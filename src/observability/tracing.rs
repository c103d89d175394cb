//! Structured logging, `RUST_LOG`-controlled. Default level is `warn`;
//! phase boundaries log at `info!`, per-item work at `debug!`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber. Call once, early in `main`.
///
/// # Panics
/// Panics if a subscriber has already been installed (e.g. called twice,
/// or from within a test binary that already installed one).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Initialize tracing with an explicit filter string, bypassing
/// `RUST_LOG`. Useful for tests or programmatic configuration.
pub fn init_tracing_with_filter(filter: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::new(filter))
        .init();
}
