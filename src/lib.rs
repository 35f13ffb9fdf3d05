//! blackd-client library
//!
//! Formats Python files by handing each one to an already running `blackd`
//! daemon over HTTP. The crate discovers candidate files, fans them out to a
//! fixed pool of workers, classifies every daemon answer into an [`Action`]
//! and folds all actions into a single [`report::Report`] that decides the
//! process exit code.
//!
//! ```text
//! walker ──paths──▶ worker × N ──actions──▶ report ──▶ exit code
//!                      │
//!                      ├── client::query   (one HTTP request per file)
//!                      ├── classify        (diff printing, check mode)
//!                      └── rewrite         (write back in place)
//! ```
//!
//! Formatting itself and the daemon's lifecycle are out of scope: the daemon
//! must already be listening.

use std::path::PathBuf;
use std::time::Duration;

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod pool;
pub mod report;
pub mod rewrite;
pub mod walker;

pub use client::{Endpoint, HttpTransport, Transport};
pub use error::{QueryError, RunError};
pub use pool::run;
pub use report::Report;

/// Exit code used for any internal or per-file error.
pub const EXIT_ERROR: u8 = 123;

/// Exit code used when check mode found files that would change.
pub const EXIT_WOULD_REFORMAT: u8 = 1;

/// Default port `blackd` listens on.
pub const DEFAULT_PORT: u16 = 45484;

/// Default host for daemon endpoints.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Terminal outcome for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// The daemon reported nothing to change.
    Unchanged,
    /// The file was rewritten with the daemon's output.
    Reformatted,
    /// The file would change but was left alone (check or diff mode).
    WouldBeReformatted,
    /// Something went wrong for this path.
    Error,
}

/// How changed files are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    /// Report pending changes instead of writing them.
    pub check: bool,
    /// Print a diff for every changed file instead of writing it.
    pub diff: bool,
}

impl Mode {
    /// True when files on disk must never be touched.
    pub fn is_dry_run(&self) -> bool {
        self.check || self.diff
    }
}

/// Controls how much per-path chatter reaches stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Changed files, errors and the summary.
    #[default]
    Normal,
    /// Everything, including files that were already formatted.
    Verbose,
}

/// Black options forwarded to the daemon as request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum line length.
    pub line_length: Option<u16>,
    /// Python versions the output must support (e.g. `py311`).
    pub target_versions: Vec<String>,
    /// Leave string quotes alone.
    pub skip_string_normalization: bool,
    /// Ignore pre-existing magic trailing commas.
    pub skip_magic_trailing_comma: bool,
    /// Enable Black's preview style.
    pub preview: bool,
    /// Skip the AST safety checks.
    pub fast: bool,
}

/// Immutable configuration for one run, shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Daemon endpoints; each one gets `max_concurrency` workers.
    pub endpoints: Vec<Endpoint>,
    /// Check/diff behaviour.
    pub mode: Mode,
    /// Workers per endpoint.
    pub max_concurrency: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Options forwarded to the daemon.
    pub format: FormatOptions,
    /// Output verbosity.
    pub verbosity: Verbosity,
    /// Files and directories to format.
    pub sources: Vec<PathBuf>,
}

impl RunConfig {
    /// Creates a configuration with defaults for everything but the
    /// endpoints and sources.
    pub fn new(endpoints: Vec<Endpoint>, sources: Vec<PathBuf>) -> Self {
        Self {
            endpoints,
            mode: Mode::default(),
            max_concurrency: 1,
            timeout: DEFAULT_TIMEOUT,
            format: FormatOptions::default(),
            verbosity: Verbosity::default(),
            sources,
        }
    }

    /// Total number of workers in the pool.
    pub fn worker_count(&self) -> usize {
        self.endpoints.len() * self.max_concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_config_defaults() {
        let config = RunConfig::new(
            vec![Endpoint::local(DEFAULT_PORT)],
            vec![PathBuf::from("src")],
        );
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.mode, Mode::default());
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn worker_count_multiplies_endpoints_by_concurrency() {
        let mut config = RunConfig::new(
            vec![Endpoint::local(45484), Endpoint::local(45485)],
            Vec::new(),
        );
        assert_eq!(config.worker_count(), 2);
        config.max_concurrency = 4;
        assert_eq!(config.worker_count(), 8);
    }

    #[test]
    fn zero_concurrency_still_gets_one_worker_per_endpoint() {
        let mut config = RunConfig::new(vec![Endpoint::local(45484)], Vec::new());
        config.max_concurrency = 0;
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn dry_run_when_check_or_diff() {
        assert!(!Mode::default().is_dry_run());
        assert!(Mode { check: true, diff: false }.is_dry_run());
        assert!(Mode { check: false, diff: true }.is_dry_run());
    }
}
