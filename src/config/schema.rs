//! TOML settings schema.
//!
//! Every section and field has a default, so a partial (or empty) file is
//! valid. Durations are human-readable strings (`"5s"`, `"1500ms"`) parsed
//! with `humantime`.
//!
//! ```toml
//! [daemon]
//! host = "127.0.0.1"
//! ports = [45484, 45485]
//! timeout = "5s"
//! max_concurrency = 4
//!
//! [format]
//! line_length = 100
//! target_versions = ["py311"]
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::config::error::ConfigError;
use crate::{FormatOptions, DEFAULT_HOST, DEFAULT_PORT};

/// Root of the settings file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Where the daemons listen and how hard to push them.
    pub daemon: DaemonSettings,
    /// Options forwarded to the daemon with every file.
    pub format: FormatSettings,
}

/// `[daemon]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonSettings {
    /// Host every port is reached on.
    pub host: String,
    /// One endpoint per port.
    pub ports: Vec<u16>,
    /// Per-request timeout. Default: `"5s"`.
    pub timeout: String,
    /// Workers per endpoint. Default: 1.
    pub max_concurrency: usize,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            ports: vec![DEFAULT_PORT],
            timeout: "5s".to_string(),
            max_concurrency: 1,
        }
    }
}

/// `[format]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FormatSettings {
    /// Maximum line length; the daemon's default when unset.
    pub line_length: Option<u16>,
    /// Target Python versions, e.g. `["py310", "py311"]`.
    pub target_versions: Vec<String>,
    /// Don't normalize string quotes or prefixes.
    pub skip_string_normalization: bool,
    /// Don't use trailing commas as a reason to split lines.
    pub skip_magic_trailing_comma: bool,
    /// Enable preview style.
    pub preview: bool,
    /// Skip the AST equivalence check.
    pub fast: bool,
}

impl Settings {
    /// Checks every value the client depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.ports.is_empty() {
            return Err(ConfigError::Invalid {
                key: "daemon.ports",
                message: "at least one port is required".to_string(),
            });
        }
        if self.daemon.ports.contains(&0) {
            return Err(ConfigError::Invalid {
                key: "daemon.ports",
                message: "port 0 is not a valid daemon port".to_string(),
            });
        }
        if self.daemon.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "daemon.host",
                message: "host must not be empty".to_string(),
            });
        }
        if self.daemon.max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "daemon.max_concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.format.line_length == Some(0) {
            return Err(ConfigError::Invalid {
                key: "format.line_length",
                message: "must be at least 1".to_string(),
            });
        }
        self.daemon.timeout()?;
        Ok(())
    }
}

impl DaemonSettings {
    /// Parses the `timeout` string.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.timeout).map_err(|e| ConfigError::Invalid {
            key: "daemon.timeout",
            message: format!("'{}': {}", self.timeout, e),
        })
    }
}

impl From<&FormatSettings> for FormatOptions {
    fn from(settings: &FormatSettings) -> Self {
        Self {
            line_length: settings.line_length,
            target_versions: settings.target_versions.clone(),
            skip_string_normalization: settings.skip_string_normalization,
            skip_magic_trailing_comma: settings.skip_magic_trailing_comma,
            preview: settings.preview,
            fast: settings.fast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.daemon.ports, vec![DEFAULT_PORT]);
        assert_eq!(settings.daemon.host, "127.0.0.1");
        assert_eq!(
            settings.daemon.timeout().expect("default timeout parses"),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn empty_ports_rejected() {
        let mut settings = Settings::default();
        settings.daemon.ports.clear();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid {
                key: "daemon.ports",
                ..
            })
        ));
    }

    #[test]
    fn zero_port_rejected() {
        let mut settings = Settings::default();
        settings.daemon.ports = vec![45484, 0];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let mut settings = Settings::default();
        settings.daemon.max_concurrency = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid {
                key: "daemon.max_concurrency",
                ..
            })
        ));
    }

    #[test]
    fn bad_timeout_rejected() {
        let mut settings = Settings::default();
        settings.daemon.timeout = "soon".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid {
                key: "daemon.timeout",
                ..
            })
        ));
    }

    #[test]
    fn human_readable_timeouts() {
        let mut daemon = DaemonSettings::default();
        daemon.timeout = "1500ms".to_string();
        assert_eq!(daemon.timeout().expect("parses"), Duration::from_millis(1500));
        daemon.timeout = "2m".to_string();
        assert_eq!(daemon.timeout().expect("parses"), Duration::from_secs(120));
    }

    #[test]
    fn format_settings_convert_to_options() {
        let settings = FormatSettings {
            line_length: Some(88),
            target_versions: vec!["py312".to_string()],
            skip_string_normalization: true,
            skip_magic_trailing_comma: false,
            preview: true,
            fast: false,
        };
        let options = FormatOptions::from(&settings);
        assert_eq!(options.line_length, Some(88));
        assert_eq!(options.target_versions, vec!["py312".to_string()]);
        assert!(options.skip_string_normalization);
        assert!(options.preview);
        assert!(!options.fast);
    }
}
