//! Decoding configuration ("valves") and its resolution.
//!
//! - `env`: environment sources and typed parsing of override variables
//!
//! Precedence is defaults < environment < explicit overrides. The result is
//! validated once per invocation and passed down explicitly.

mod env;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use env::{EnvSource, MapEnv, ProcessEnv, ENV_VARS};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_K: usize = 10;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 256;
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid environment variable {var}={value:?}: {reason}")]
    InvalidEnv { var: &'static str, value: String, reason: String },

    #[error("Failed to read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Failed to parse config file: {0}")]
    Parse(String),
}

/// Fully resolved configuration for one decoding invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodingConfig {
    /// Full generate endpoint of the backend.
    pub backend_url: String,
    pub model: String,
    /// Number of candidates to sample.
    pub k: usize,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Build and return a trace of every candidate.
    pub debug: bool,
    pub request_timeout_ms: u64,
    /// Upper bound on in-flight backend requests.
    pub max_concurrency: usize,
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            model: String::new(),
            k: DEFAULT_K,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            debug: true,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_concurrency: 1,
        }
    }
}

impl DecodingConfig {
    /// Resolve defaults, then `source`, then `explicit`, and validate the result.
    pub fn resolve(explicit: &ConfigOverrides, source: &dyn EnvSource) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        env::read_overrides(source, explicit)?.apply_to(&mut config);
        explicit.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingField("model"));
        }
        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::MissingField("backend_url"));
        }
        if self.k == 0 {
            return Err(invalid("k", "must be >= 1"));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(invalid("temperature", "must be a finite value >= 0"));
        }
        if self.max_tokens == 0 {
            return Err(invalid("max_tokens", "must be >= 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be >= 1"));
        }
        if self.max_concurrency == 0 {
            return Err(invalid("max_concurrency", "must be >= 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue { field, reason: reason.to_string() }
}

/// Caller-supplied configuration. Unset fields fall through to the
/// environment and then to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub model: Option<String>,
    pub k: Option<usize>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub debug: Option<bool>,
    pub request_timeout_ms: Option<u64>,
    pub max_concurrency: Option<usize>,
}

impl ConfigOverrides {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            backend_url: other.backend_url.or(self.backend_url),
            model: other.model.or(self.model),
            k: other.k.or(self.k),
            temperature: other.temperature.or(self.temperature),
            max_tokens: other.max_tokens.or(self.max_tokens),
            debug: other.debug.or(self.debug),
            request_timeout_ms: other.request_timeout_ms.or(self.request_timeout_ms),
            max_concurrency: other.max_concurrency.or(self.max_concurrency),
        }
    }

    fn apply_to(&self, config: &mut DecodingConfig) {
        if let Some(ref url) = self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(ref model) = self.model {
            config.model = model.clone();
        }
        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(t) = self.temperature {
            config.temperature = t;
        }
        if let Some(n) = self.max_tokens {
            config.max_tokens = n;
        }
        if let Some(d) = self.debug {
            config.debug = d;
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(c) = self.max_concurrency {
            config.max_concurrency = c;
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
