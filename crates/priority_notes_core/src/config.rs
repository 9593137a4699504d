//! Runtime configuration for the note store and its remote.
//!
//! Resolution order for the config file:
//! 1. explicit path passed by the caller
//! 2. `$PRIORITY_NOTES_CONFIG`
//! 3. `<platform config dir>/priority-notes/config.toml`
//!
//! A missing file yields defaults. Unset fields fall back individually.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "PRIORITY_NOTES_CONFIG";
const APP_DIR_NAME: &str = "priority-notes";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "priority_notes.sqlite3";
const DEFAULT_CREATE_URL: &str = "http://127.0.0.1:8080/api/priority-notes";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config file `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config file `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// On-disk shape; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    db_path: Option<PathBuf>,
    create_url: Option<String>,
    request_timeout_secs: Option<u64>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    /// SQLite file backing the durable key-value store.
    pub db_path: PathBuf,
    /// URL receiving remote create requests.
    pub create_url: String,
    pub request_timeout: Duration,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl Default for NotesConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            create_url: DEFAULT_CREATE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level: default_log_level().to_string(),
            log_dir: data_dir.join("logs"),
        }
    }
}

impl NotesConfig {
    /// Loads from the resolved config path; missing file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = resolve_config_path(explicit);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path, source },
            other => other,
        })
    }

    /// Parses TOML text and fills unset fields with defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        let defaults = Self::default();

        let request_timeout = match raw.request_timeout_secs {
            Some(0) => {
                return Err(ConfigError::Invalid(
                    "request_timeout_secs must be greater than zero".to_string(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };
        let create_url = match raw.create_url {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::Invalid("create_url cannot be empty".to_string()))
            }
            Some(url) => url.trim().to_string(),
            None => defaults.create_url,
        };

        Ok(Self {
            db_path: raw.db_path.unwrap_or(defaults.db_path),
            create_url,
            request_timeout,
            log_level: raw.log_level.unwrap_or(defaults.log_level),
            log_dir: raw.log_dir.unwrap_or(defaults.log_dir),
        })
    }
}

/// Returns the config file path that `load` would read.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, NotesConfig};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    #[test]
    fn empty_file_yields_defaults() {
        let config = NotesConfig::from_toml_str("").unwrap();
        assert_eq!(config, NotesConfig::default());
        assert!(config.db_path.ends_with("priority_notes.sqlite3"));
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config = NotesConfig::from_toml_str(
            r#"
            create_url = "https://notes.example.com/api/notes"
            request_timeout_secs = 3
            db_path = "/tmp/notes.sqlite3"
            "#,
        )
        .unwrap();
        assert_eq!(config.create_url, "https://notes.example.com/api/notes");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.db_path, PathBuf::from("/tmp/notes.sqlite3"));
        assert_eq!(config.log_dir, NotesConfig::default().log_dir);
    }

    #[test]
    fn rejects_zero_timeout_and_unknown_keys() {
        let err = NotesConfig::from_toml_str("request_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = NotesConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_explicit_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NotesConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, NotesConfig::default());
    }

    #[test]
    fn parse_error_reports_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "create_url = ").unwrap();
        let err = NotesConfig::load(Some(Path::new(&path))).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
