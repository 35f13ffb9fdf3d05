//! Error types for blackd-client.
//!
//! Errors fall into two groups:
//! - per-path errors ([`QueryError`] except `Protocol`, [`RewriteError`],
//!   [`MalformedDiff`]) which turn into an `Action::Error` for one file
//! - fatal errors ([`RunError`]) which stop the whole run

use std::path::PathBuf;
use thiserror::Error;

/// Failure while sending one file to the daemon.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The source file could not be opened or read.
    #[error("{source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The daemon could not be reached, or the request timed out.
    #[error("couldn't reach blackd: {message}")]
    Transport {
        /// File whose request failed.
        path: PathBuf,
        /// Description of the network failure.
        message: String,
    },

    /// The daemon answered with a status outside its contract.
    #[error("unsupported HTTP status: {status}")]
    Protocol {
        /// File whose request got the unexpected status.
        path: PathBuf,
        /// The HTTP status code.
        status: u16,
    },
}

impl QueryError {
    /// Returns true when the error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, QueryError::Protocol { .. })
    }
}

/// Failure while writing reformatted content back to disk.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The replacement file could not be created next to the target.
    #[error("cannot create file: {source}")]
    Create {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing or flushing the new content failed.
    #[error("cannot write file: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The durable sync after writing failed.
    #[error("cannot sync file: {source}")]
    Sync {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Moving the replacement over the original failed.
    #[error("cannot replace file: {source}")]
    Rename {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// The daemon returned a diff without its two header lines.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("blackd returned an invalid diff")]
pub struct MalformedDiff;

/// Failure while walking the source roots.
#[derive(Debug, Error)]
pub enum WalkError {
    /// A root path given on the command line cannot be traversed.
    #[error("error traversing {}: {source}", path.display())]
    Root {
        /// The root path.
        path: PathBuf,
        /// Underlying walk error.
        #[source]
        source: walkdir::Error,
    },
}

/// Errors that stop the run before every path has been classified.
#[derive(Debug, Error)]
pub enum RunError {
    /// Traversal of a root failed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The daemon violated its status-code contract.
    #[error("unsupported HTTP status {status} from blackd while formatting {}", path.display())]
    Protocol {
        /// File being formatted when the violation was seen.
        path: PathBuf,
        /// The HTTP status code.
        status: u16,
    },

    /// No daemon endpoint was configured.
    #[error("no blackd endpoint configured")]
    NoEndpoints,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// A worker or traversal task panicked or was cancelled.
    #[error("task failed: {0}")]
    Runtime(String),
}
