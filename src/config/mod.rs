//! Configuration management.
//!
//! Settings come from three layers, highest priority first:
//! 1. Command-line flags (clap also binds `TEMPO_USER_ID`, `TEMPO_API_KEY`,
//!    `EDITOR`, `TEMPOVI_BASE_URL`)
//! 2. The JSON config file, `<config_dir>/tempovi/config.json` by default
//! 3. Built-in defaults
//!
//! Resolution happens once in the binary. Everything below receives a
//! [`Settings`] value and never looks at the environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::Layout;
use crate::error::{Error, Result};
use crate::tempo::{TempoConfig, DEFAULT_BASE_URL};

pub const DEFAULT_EDITOR: &str = "vim";

/// Contents of `config.json`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_id: Option<String>,
    pub api_key: Option<String>,
    pub editor: Option<String>,
    pub base_url: Option<String>,
    pub layout: Option<Layout>,
}

/// Default location of the config file.
///
/// # Errors
///
/// Returns a config error if no home directory can be determined.
pub fn default_config_path() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|b| b.config_dir().join("tempovi").join("config.json"))
        .ok_or_else(|| Error::Config("Could not determine config directory".into()))
}

/// Load the config file at `path`. A missing file is an empty config.
///
/// # Errors
///
/// Returns a config error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
    })
}

/// Values given on the command line (or their bound env vars).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub user_id: Option<String>,
    pub api_key: Option<String>,
    pub editor: Option<String>,
    pub base_url: Option<String>,
    pub layout: Option<Layout>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub user_id: Option<String>,
    pub api_key: Option<String>,
    pub editor: String,
    pub base_url: String,
    pub layout: Layout,
}

/// Empty strings count as unset.
fn pick(flag: Option<String>, file: Option<String>) -> Option<String> {
    flag.filter(|v| !v.trim().is_empty())
        .or_else(|| file.filter(|v| !v.trim().is_empty()))
}

impl Settings {
    #[must_use]
    pub fn resolve(overrides: Overrides, file: Config) -> Self {
        Self {
            user_id: pick(overrides.user_id, file.user_id),
            api_key: pick(overrides.api_key, file.api_key),
            editor: pick(overrides.editor, file.editor)
                .unwrap_or_else(|| DEFAULT_EDITOR.to_string()),
            base_url: pick(overrides.base_url, file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            layout: overrides.layout.or(file.layout).unwrap_or_default(),
        }
    }

    /// Connection settings for the remote service.
    ///
    /// # Errors
    ///
    /// Returns a config error naming `user_id` or `api_key` when missing.
    pub fn tempo(&self) -> Result<TempoConfig> {
        let user_id = self
            .user_id
            .clone()
            .ok_or_else(|| Error::Config("missing user_id (Tempo account id)".into()))?;
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("missing api_key (Tempo API token)".into()))?;
        Ok(TempoConfig {
            base_url: self.base_url.clone(),
            user_id,
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"user_id": "abc", "layout": "flat"}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.user_id.as_deref(), Some("abc"));
        assert_eq!(config.layout, Some(Layout::Flat));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_flags_beat_file_beat_defaults() {
        let file = Config {
            user_id: Some("from-file".into()),
            api_key: Some("file-key".into()),
            editor: Some("nano".into()),
            ..Config::default()
        };
        let overrides = Overrides {
            user_id: Some("from-flag".into()),
            api_key: Some(String::new()),
            ..Overrides::default()
        };

        let settings = Settings::resolve(overrides, file);
        assert_eq!(settings.user_id.as_deref(), Some("from-flag"));
        assert_eq!(settings.api_key.as_deref(), Some("file-key"));
        assert_eq!(settings.editor, "nano");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.layout, Layout::Blocks);
    }

    #[test]
    fn test_tempo_requires_credentials() {
        let settings = Settings::resolve(Overrides::default(), Config::default());
        assert_eq!(settings.editor, DEFAULT_EDITOR);
        let err = settings.tempo().unwrap_err();
        assert!(err.to_string().contains("user_id"));
        assert!(err.hint().is_some());
    }
}
