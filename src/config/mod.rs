/// Configuration error types.
pub mod error;

/// Settings file loader.
pub mod loader;

/// TOML settings schema types.
pub mod schema;

/// XDG Base Directory path resolution.
pub mod xdg;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{DaemonSettings, FormatSettings, Settings};
