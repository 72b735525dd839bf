use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing output.
///
/// Uses the `RUST_LOG` environment variable if set, otherwise falls back to
/// `default_level` from config (e.g. "info", "guard_daemon=debug,warn").
/// JSON mode suits log shippers; the human-readable format is for
/// interactive runs.
///
/// Safe to call multiple times (e.g. in tests) -- subsequent calls are no-ops.
pub fn init_logging(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .try_init()
            .ok();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .try_init()
            .ok();
    }
}
