//! Startup configuration.
//!
//! Resolution order: built-in defaults, then the JSON file named by
//! `SCENE_COMPOSER_CONFIG_PATH`, then individual environment overrides.
//! Blank values are ignored at every layer.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::apply::ApplyPolicy;
use crate::session::ConversationMode;

pub const CONFIG_PATH_ENV_VAR: &str = "SCENE_COMPOSER_CONFIG_PATH";
pub const API_KEY_ENV_VAR: &str = "SCENE_COMPOSER_API_KEY";
pub const API_URL_ENV_VAR: &str = "SCENE_COMPOSER_API_URL";
pub const MODEL_ENV_VAR: &str = "SCENE_COMPOSER_MODEL";
pub const MODE_ENV_VAR: &str = "SCENE_COMPOSER_MODE";

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown conversation mode '{0}'; expected 'ask' or 'composer'")]
    UnknownMode(String),

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub mode: ConversationMode,
    pub max_tokens: u32,
    pub apply: ApplyPolicy,
    pub drain_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            mode: ConversationMode::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            apply: ApplyPolicy::default(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_key: Option<String>,
    api_url: Option<String>,
    model: Option<String>,
    mode: Option<String>,
    max_tokens: Option<u32>,
    document_write_attempts: Option<u32>,
    retry_backoff_ms: Option<u64>,
    drain_timeout_ms: Option<u64>,
}

impl ChatConfig {
    /// Loads defaults, the optional config file, and environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = env_string_opt(CONFIG_PATH_ENV_VAR) {
            config.merge_file(Path::new(&path))?;
        }
        config.merge_env()?;
        Ok(config)
    }

    /// Loads defaults overlaid with one JSON file, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(api_key) = non_blank(file.api_key) {
            self.api_key = Some(api_key);
        }
        if let Some(api_url) = non_blank(file.api_url) {
            self.api_url = api_url;
        }
        if let Some(model) = non_blank(file.model) {
            self.model = model;
        }
        if let Some(mode) = non_blank(file.mode) {
            self.mode = parse_mode(&mode)?;
        }
        if let Some(max_tokens) = file.max_tokens {
            self.max_tokens = positive(max_tokens, "max_tokens")?;
        }
        if let Some(attempts) = file.document_write_attempts {
            self.apply.document_write_attempts = positive(attempts, "document_write_attempts")?;
        }
        if let Some(backoff_ms) = file.retry_backoff_ms {
            self.apply.retry_backoff = Duration::from_millis(backoff_ms);
        }
        if let Some(drain_ms) = file.drain_timeout_ms {
            self.drain_timeout = Duration::from_millis(drain_ms);
        }

        Ok(())
    }

    fn merge_env(&mut self) -> Result<(), ConfigError> {
        if let Some(api_key) = env_string_opt(API_KEY_ENV_VAR) {
            self.api_key = Some(api_key.trim().to_string());
        }
        if let Some(api_url) = env_string_opt(API_URL_ENV_VAR) {
            self.api_url = api_url.trim().to_string();
        }
        if let Some(model) = env_string_opt(MODEL_ENV_VAR) {
            self.model = model.trim().to_string();
        }
        if let Some(mode) = env_string_opt(MODE_ENV_VAR) {
            self.mode = parse_mode(&mode)?;
        }
        Ok(())
    }
}

fn parse_mode(value: &str) -> Result<ConversationMode, ConfigError> {
    ConversationMode::parse(value).ok_or_else(|| ConfigError::UnknownMode(value.trim().to_string()))
}

fn positive(value: u32, field: &'static str) -> Result<u32, ConfigError> {
    if value == 0 {
        Err(ConfigError::NotPositive { field })
    } else {
        Ok(value)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
