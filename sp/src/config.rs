//! Studio configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::FileSessionStore;

/// Main studio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gateway connection
    pub backend: BackendConfig,

    /// Session storage
    pub session: SessionConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

/// Gateway connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the gateway
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Session storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding the user record (defaults to the user data directory)
    pub dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(FileSessionStore::default_dir)
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: ./athea.yml
        let local_config = PathBuf::from("athea.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/athea/athea.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("athea").join("athea.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = config_path.cloned().or_else(|| {
            let local = PathBuf::from("athea.yml");
            if local.exists() {
                return Some(local);
            }
            dirs::config_dir()
                .map(|d| d.join("athea").join("athea.yml"))
                .filter(|p| p.exists())
        })?;
        let content = fs::read_to_string(path).ok()?;
        serde_yaml::from_str::<Self>(&content).ok()?.log_level
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:3000");
        assert!(config.session.dir.is_none());
        assert!(config.session.resolved_dir().ends_with("athea"));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_load_kebab_case_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("athea.yml");
        fs::write(
            &path,
            "backend:\n  base-url: http://gw.local:8080\nsession:\n  dir: /tmp/athea-session\nlog-level: debug\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.backend.base_url, "http://gw.local:8080");
        assert_eq!(config.session.resolved_dir(), PathBuf::from("/tmp/athea-session"));
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("athea.yml");
        fs::write(&path, "log-level: warn\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let path = PathBuf::from("/nonexistent/athea/athea.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }
}
