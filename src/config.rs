//! Settings module
//!
//! This module loads the user's settings from a TOML file in the system's
//! standard config directory. Every setting has a default, so a missing file
//! simply means "use the defaults".

use crate::subtitle_retrieval::DEFAULT_BASE_URL;
use crate::transcode::SourceEncoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Environment variable pointing at an alternative settings file
pub const CONFIG_PATH_ENV: &str = "FELIRATOK_CONFIG";

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the settings file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has invalid values
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// User settings for searching and downloading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Only return results whose title equals the searched title
    pub exact_match: bool,
    /// Encoding downloaded subtitles are converted from
    pub source_encoding: SourceEncoding,
    /// Address of the catalog
    pub base_url: String,
    /// Upper bound for a single HTTP request, in seconds
    pub request_timeout_secs: Option<u64>,
    /// User agent sent to the catalog
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exact_match: true,
            source_encoding: SourceEncoding::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            user_agent: concat!("feliratok/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the first location that applies:
    ///
    /// 1. `explicit_path`, which must exist
    /// 2. the file named by `FELIRATOK_CONFIG`, which must exist
    /// 3. `config.toml` in the platform config directory, if present
    ///
    /// Falls back to defaults when none of these yields a file.
    ///
    /// # Arguments
    ///
    /// * `explicit_path` - A settings file chosen by the user, e.g. `--config`
    ///
    /// # Returns
    ///
    /// A Result containing the settings, or a ConfigError when a chosen file
    /// cannot be read or is not valid TOML. A missing default file is not an
    /// error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Reads settings from a TOML file
    ///
    /// Keys missing from the file keep their default values.
    ///
    /// # Arguments
    ///
    /// * `path` - The TOML file to read
    ///
    /// # Returns
    ///
    /// A Result containing the settings, or a ConfigError naming `path`
    ///
    /// # Examples
    ///
    /// ```
    /// use feliratok::{Settings, SourceEncoding};
    ///
    /// let path = std::env::temp_dir().join("feliratok-doc-settings.toml");
    /// std::fs::write(&path, "source_encoding = \"latin1\"\n").unwrap();
    ///
    /// let settings = Settings::from_file(&path).unwrap();
    /// assert_eq!(settings.source_encoding, SourceEncoding::Latin1);
    /// assert!(settings.exact_match);
    /// # std::fs::remove_file(&path).ok();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(settings)
    }

    /// The request timeout, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// `config.toml` in the platform's config directory for this application
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("eu", "feliratok", "feliratok")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.exact_match);
        assert_eq!(settings.source_encoding, SourceEncoding::Latin2);
        assert_eq!(settings.base_url, "https://feliratok.eu");
        assert_eq!(settings.request_timeout(), None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str("source_encoding = \"utf8\"").unwrap();
        assert_eq!(settings.source_encoding, SourceEncoding::Utf8);
        assert!(settings.exact_match);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_full_file() {
        let settings: Settings = toml::from_str(
            r#"
            exact_match = false
            source_encoding = "latin1"
            base_url = "http://localhost:8080"
            request_timeout_secs = 30
            user_agent = "test-agent"
            "#,
        )
        .unwrap();

        assert!(!settings.exact_match);
        assert_eq!(settings.source_encoding, SourceEncoding::Latin1);
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.user_agent, "test-agent");
    }

    #[test]
    fn test_invalid_encoding_is_rejected() {
        assert!(toml::from_str::<Settings>("source_encoding = \"cp1250\"").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join("feliratok_test_config.toml");
        fs::write(&path, "exact_match = false\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert!(!settings.exact_match);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let path = Path::new("/nonexistent/feliratok/config.toml");
        assert!(matches!(
            Settings::load(Some(path)),
            Err(ConfigError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_load_malformed_file() {
        let path = std::env::temp_dir().join("feliratok_test_bad_config.toml");
        fs::write(&path, "exact_match = \"sometimes\"\n").unwrap();

        assert!(matches!(
            Settings::from_file(&path),
            Err(ConfigError::ParseFailed { .. })
        ));

        fs::remove_file(&path).ok();
    }
}
