//! Judge and embedding configuration.
//!
//! Configuration is loaded from environment variables (`CROSSMARK_*`
//! prefixed) on top of the compile-time defaults in
//! [`crossmark_core::defaults`].
//!
//! # Example
//!
//! ```rust,no_run
//! use crossmark_inference::config::JudgeConfig;
//!
//! let config = JudgeConfig::from_env();
//! config.validate().expect("invalid judge configuration");
//! ```

use std::env;

use thiserror::Error;

use crossmark_core::defaults;
use crossmark_core::env::env_or;

use crate::judge::JudgeEndpoint;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn validate_url(label: &str, url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} base_url cannot be empty",
            label
        )));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{} base_url must start with http:// or https://, got: {}",
            label, url
        )));
    }
    Ok(())
}

// =============================================================================
// JUDGE
// =============================================================================

/// Settings for the external judge.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeConfig {
    /// Base URL shared by every endpoint in the chain.
    pub base_url: String,
    pub model: String,
    /// Sent as a bearer token when set.
    pub api_token: Option<String>,
    /// Per-attempt timeout.
    pub timeout_secs: u64,
    /// Consecutive failed calls before the breaker opens.
    pub error_limit: u32,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Endpoints tried in order on every call.
    pub endpoints: Vec<JudgeEndpoint>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::JUDGE_URL.to_string(),
            model: defaults::JUDGE_MODEL.to_string(),
            api_token: None,
            timeout_secs: defaults::JUDGE_TIMEOUT_SECS,
            error_limit: defaults::JUDGE_ERROR_LIMIT,
            temperature: defaults::JUDGE_TEMPERATURE,
            max_tokens: defaults::JUDGE_MAX_TOKENS,
            endpoints: JudgeEndpoint::default_chain(),
        }
    }
}

impl JudgeConfig {
    /// Build from `CROSSMARK_JUDGE_*` environment variables.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            base_url: env::var("CROSSMARK_JUDGE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(default.base_url),
            model: env::var("CROSSMARK_JUDGE_MODEL").unwrap_or(default.model),
            api_token: env::var("CROSSMARK_JUDGE_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout_secs: env_or("CROSSMARK_JUDGE_TIMEOUT_SECS", default.timeout_secs),
            error_limit: env_or("CROSSMARK_JUDGE_ERROR_LIMIT", default.error_limit),
            ..default
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_error_limit(mut self, error_limit: u32) -> Self {
        self.error_limit = error_limit;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<JudgeEndpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_url("Judge", &self.base_url)?;
        if self.model.is_empty() {
            return Err(ConfigError::Validation(
                "Judge model cannot be empty".to_string(),
            ));
        }
        if self.error_limit == 0 {
            return Err(ConfigError::Validation(
                "Judge error_limit must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "Judge timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.endpoints.is_empty() {
            return Err(ConfigError::Validation(
                "Judge needs at least one endpoint".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// EMBEDDING
// =============================================================================

/// Settings for the Ollama embedding backend.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedConfig {
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::JUDGE_URL.to_string(),
            model: defaults::EMBED_MODEL.to_string(),
            dimension: defaults::EMBED_DIMENSION,
            timeout_secs: defaults::EMBED_TIMEOUT_SECS,
        }
    }
}

impl EmbedConfig {
    /// Build from `CROSSMARK_EMBED_*` environment variables.
    ///
    /// The base URL falls back to the judge URL, since both usually point at
    /// the same Ollama host.
    pub fn from_env() -> Self {
        let default = Self::default();
        let base_url = env::var("CROSSMARK_EMBED_URL")
            .or_else(|_| env::var("CROSSMARK_JUDGE_URL"))
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(default.base_url);
        Self {
            base_url,
            model: env::var("CROSSMARK_EMBED_MODEL").unwrap_or(default.model),
            dimension: env_or("CROSSMARK_EMBED_DIM", default.dimension),
            timeout_secs: env_or("CROSSMARK_EMBED_TIMEOUT_SECS", default.timeout_secs),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_url("Embedding", &self.base_url)?;
        if self.model.is_empty() {
            return Err(ConfigError::Validation(
                "Embedding model cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
