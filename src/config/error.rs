//! Configuration error types for loading and validating the settings file.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the settings file from disk.
    #[error("Failed to read configuration file: {}", path.display())]
    ReadError {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("Invalid configuration at {}:{line}:{column}: {message}", path.display())]
    ParseError {
        /// Path to the file containing the error.
        path: PathBuf,
        /// One-based line of the error (0 if unknown).
        line: usize,
        /// One-based column of the error (0 if unknown).
        column: usize,
        /// Human-readable description of the parse failure.
        message: String,
    },

    /// An explicitly requested settings file does not exist.
    #[error("Configuration file not found: {}", path.display())]
    NotFound {
        /// Path that was requested but does not exist.
        path: PathBuf,
    },

    /// A setting holds a value the client cannot use.
    #[error("Invalid setting `{key}`: {message}")]
    Invalid {
        /// Dotted name of the setting, e.g. `daemon.ports`.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
