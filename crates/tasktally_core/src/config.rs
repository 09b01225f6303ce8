//! Runtime configuration.
//!
//! Values are resolved in three layers, later layers winning:
//! 1. built-in defaults
//! 2. environment variables (`TASKTALLY_DB`, `TASKTALLY_LOG_LEVEL`,
//!    `TASKTALLY_LOG_DIR`)
//! 3. explicit overrides, usually command-line flags
//!
//! File logging stays off unless a log directory is configured.

use crate::logging::{default_log_level, normalize_level};
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "TASKTALLY_DB";
pub const ENV_LOG_LEVEL: &str = "TASKTALLY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKTALLY_LOG_DIR";

const DEFAULT_DB_FILE: &str = "tasktally.sqlite3";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("database path cannot be empty")]
    EmptyDbPath,
    #[error("unsupported log level `{0}`")]
    InvalidLogLevel(String),
    #[error("log directory must be an absolute path, got `{}`", .0.display())]
    RelativeLogDir(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

/// Values that replace configured settings when present.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl TrackerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self::default().with_overrides(ConfigOverrides {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(db_path) = overrides.db_path {
            if db_path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyDbPath);
            }
            self.db_path = db_path;
        }
        if let Some(level) = overrides.log_level {
            self.log_level =
                normalize_level(&level).map_err(|_| ConfigError::InvalidLogLevel(level))?;
        }
        if let Some(log_dir) = overrides.log_dir {
            if !log_dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(log_dir));
            }
            self.log_dir = Some(log_dir);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ConfigOverrides, TrackerConfig, ENV_DB_PATH, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn environment_overrides_defaults_and_flags_override_environment() {
        let config =
            TrackerConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "/tmp/env.db"), (ENV_LOG_LEVEL, "WARN")]))
                .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/env.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);

        let config = config
            .with_overrides(ConfigOverrides {
                db_path: Some(PathBuf::from("/tmp/flag.db")),
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/flag.db"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let config = TrackerConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  ")])).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = TrackerConfig::default()
            .with_overrides(ConfigOverrides {
                log_level: Some("loud".to_string()),
                ..ConfigOverrides::default()
            })
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogLevel("loud".to_string()));

        let err = TrackerConfig::default()
            .with_overrides(ConfigOverrides {
                log_dir: Some(PathBuf::from("relative/logs")),
                ..ConfigOverrides::default()
            })
            .unwrap_err();
        assert_eq!(err, ConfigError::RelativeLogDir(PathBuf::from("relative/logs")));
    }
}
