//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::catalog::DEFAULT_PAGE_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            page_limit: default_page_limit(),
        }
    }
}

/// Where the bearer token is kept between runs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Token file; `None` means the per-user data directory
    pub token_file: Option<PathBuf>,
}

impl SessionConfig {
    pub fn token_path(&self) -> PathBuf {
        self.token_file.clone().unwrap_or_else(default_token_path)
    }
}

fn default_token_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("laptop-store"))
        .unwrap_or_else(|| PathBuf::from("./laptop_store_data"))
        .join("auth_token")
}

/// Shopping assistant configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    pub api_key: Option<String>,

    #[serde(default = "default_assistant_model")]
    pub model: String,

    #[serde(default = "default_assistant_url")]
    pub base_url: String,
}

fn default_assistant_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_assistant_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_assistant_model(),
            base_url: default_assistant_url(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("laptop-store").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing file of `paths`, or defaults when none exists
    fn load_first(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => {
                tracing::debug!("Using default config with environment overrides");
                Ok(Self::from_env())
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup; empty values are ignored
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // API overrides
        if let Some(url) = var("LAPTOP_STORE_API_URL") {
            self.api.base_url = url;
        }

        // Session overrides
        if let Some(path) = var("LAPTOP_STORE_TOKEN_FILE") {
            self.session.token_file = Some(PathBuf::from(path));
        }

        // Assistant overrides
        if let Some(key) = var("LAPTOP_STORE_ASSISTANT_KEY").or_else(|| var("GEMINI_API_KEY")) {
            self.assistant.api_key = Some(key);
        }
        if let Some(model) = var("LAPTOP_STORE_ASSISTANT_MODEL") {
            self.assistant.model = model;
        }

        // Logging overrides
        if let Some(level) = var("LAPTOP_STORE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("LAPTOP_STORE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Laptop Store Configuration
#
# Environment variables override these settings:
# - LAPTOP_STORE_API_URL
# - LAPTOP_STORE_TOKEN_FILE
# - LAPTOP_STORE_ASSISTANT_KEY (or GEMINI_API_KEY)
# - LAPTOP_STORE_ASSISTANT_MODEL
# - LAPTOP_STORE_LOG_LEVEL
# - LAPTOP_STORE_LOG_FORMAT

[api]
# Backend REST API base URL
base_url = "http://localhost:3000/api"

# Request timeout in seconds
request_timeout_secs = 30

# Laptops per listing page
page_limit = 9

[session]
# File holding the auth token between runs
# token_file = "~/.local/share/laptop-store/auth_token"

[assistant]
# Gemini API key for the shopping assistant
# api_key = ""

# Model used for chat
model = "gemini-2.5-flash"

# Generative Language API base URL
base_url = "https://generativelanguage.googleapis.com/v1beta"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
