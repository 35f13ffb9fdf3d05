//! Logging initialization.
//!
//! Diagnostics go through `tracing` to stderr, filtered by the
//! `BLACKD_CLIENT_LOG` environment variable. Per-file results are not log
//! lines: they are printed by the workers and the report regardless of the
//! filter.
//!
//! ```bash
//! # Default (warn level)
//! blackd-client src/
//!
//! # See every request
//! BLACKD_CLIENT_LOG=debug blackd-client src/
//!
//! # Only the client library
//! BLACKD_CLIENT_LOG=blackd_client=trace,warn blackd-client src/
//! ```

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "BLACKD_CLIENT_LOG";

/// Level used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Builds the filter from [`LOG_ENV`], falling back to [`DEFAULT_DIRECTIVE`].
pub fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber.
///
/// Does nothing if a subscriber is already set, so tests that drive the
/// binary entry point more than once stay safe.
pub fn init() {
    let _ = fmt()
        .with_env_filter(filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
