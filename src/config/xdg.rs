//! Settings file location.
//!
//! Resolution order:
//! 1. `$XDG_CONFIG_HOME/blackd-client/config.toml` (if the variable is set)
//! 2. Platform default from `dirs`:
//!    - Linux: `~/.config/blackd-client/config.toml`
//!    - macOS: `~/Library/Application Support/blackd-client/config.toml`

use std::path::PathBuf;

const APP_NAME: &str = "blackd-client";

/// Returns the configuration directory, or `None` when no home directory
/// can be determined.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg).join(APP_NAME));
    }
    dirs::config_dir().map(|base| base.join(APP_NAME))
}

/// Returns the path of the default settings file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
