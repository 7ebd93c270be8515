use tracing_subscriber::{fmt, EnvFilter};

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize structured logging for the service.
///
/// Cache hits and misses only show up at `debug`; run with
/// `RUST_LOG=holiday_alerts=debug` to see them. Must be called once, at
/// startup; a second call is a no-op.
pub fn init_logging() {
    let initialized = fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .compact()
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("Logging initialized");
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
