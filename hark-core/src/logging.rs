//! Tracing subscriber initialization.

use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "HARK_LOG";

/// Initialize the global tracing subscriber.
///
/// Filter comes from `HARK_LOG` (standard `EnvFilter` syntax), defaulting
/// to `info`. Returns false when a subscriber was already installed;
/// callers treat that as success, so init is safe to attempt from any
/// entry point.
pub fn init() -> bool {
    init_with_default("info")
}

/// Initialize with an explicit fallback filter.
pub fn init_with_default(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
