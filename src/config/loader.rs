//! Settings file loader with position-aware error reporting.
//!
//! An explicit path must exist. The default XDG location is optional: when
//! nothing is there, built-in defaults apply.

use std::fs;
use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::schema::Settings;
use crate::config::xdg;

/// Stateless settings loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path` if given, otherwise the default location.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_default(),
        }
    }

    /// Loads and validates settings from a specific file.
    pub fn load_from_path(path: &Path) -> Result<Settings, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let settings = Self::parse_toml(&content, path)?;
        settings.validate()?;
        tracing::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Loads settings from the default location, falling back to defaults
    /// when no file exists there.
    pub fn load_default() -> Result<Settings, ConfigError> {
        match xdg::config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            other => {
                tracing::debug!("no settings file at {:?}, using defaults", other);
                Ok(Settings::default())
            }
        }
    }

    /// Parses TOML into [`Settings`], translating the error span into a
    /// one-based line and column.
    fn parse_toml(content: &str, path: &Path) -> Result<Settings, ConfigError> {
        toml::from_str(content).map_err(|e| {
            let (line, column) = e
                .span()
                .map(|span| line_column(content, span.start))
                .unwrap_or((0, 0));
            ConfigError::ParseError {
                path: path.to_path_buf(),
                line,
                column,
                message: e.message().to_string(),
            }
        })
    }
}

fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = content.get(..offset).unwrap_or(content);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
    (line, offset - line_start + 1)
}
