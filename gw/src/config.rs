//! Gateway configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::LlmError;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Generative-AI provider configuration
    pub llm: LlmConfig,

    /// Prompt template configuration
    pub prompts: PromptsConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// A missing credential is not fatal: the server still starts and every
    /// provider-backed route answers 500 until the variable is set.
    pub fn validate(&self) -> Result<()> {
        self.validate_limits()?;
        if self.llm.get_api_key().is_err() {
            return Err(eyre::eyre!(
                "Provider API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.llm.provider != "gemini" {
            return Err(eyre::eyre!(
                "Unknown provider '{}'. Supported: gemini",
                self.llm.provider
            ));
        }
        Ok(())
    }

    /// Check the settings without which no request can succeed
    pub fn validate_limits(&self) -> Result<()> {
        if self.llm.timeout_ms == 0 {
            return Err(eyre::eyre!("llm.timeout-ms must be greater than 0"));
        }
        if self.server.body_limit_mb == 0 {
            return Err(eyre::eyre!("server.body-limit-mb must be greater than 0"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: ./athea-gw.yml
        let local_config = PathBuf::from("athea-gw.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/athea/gateway.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("athea").join("gateway.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    ///
    /// Errors are swallowed: a broken file is reported later by `load`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = config_path.cloned().or_else(|| {
            let local = PathBuf::from("athea-gw.yml");
            if local.exists() {
                return Some(local);
            }
            dirs::config_dir()
                .map(|d| d.join("athea").join("gateway.yml"))
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

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind: String,

    /// Allow cross-origin requests from the browser UI
    pub cors: bool,

    /// Largest accepted request body in MiB (base64 images count here)
    #[serde(rename = "body-limit-mb")]
    pub body_limit_mb: usize,
}

impl ServerConfig {
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            cors: true,
            body_limit_mb: 32,
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Model used by each route
    pub models: ModelsConfig,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String, LlmError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LlmError::MissingCredential(self.api_key_env.clone())),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_ms: 120_000,
            models: ModelsConfig::default(),
        }
    }
}

/// Model identifiers per route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Context and model-style suggestions
    pub suggest: String,

    /// Shooting plan and generic text generation
    pub plan: String,

    /// Pose prompt JSON generation
    pub pose: String,

    /// Image rendering
    pub image: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            suggest: "gemini-2.5-flash".to_string(),
            plan: "gemini-1.5-pro".to_string(),
            pose: "gemini-2.5-flash".to_string(),
            image: "gemini-2.5-flash-image".to_string(),
        }
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory with `{name}.pmt` overrides for the embedded templates
    pub dir: Option<PathBuf>,
}
