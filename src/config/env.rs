//! Environment variable sources and typed override parsing.

use std::collections::HashMap;
use std::str::FromStr;

use super::{ConfigError, ConfigOverrides};

pub const ENV_BACKEND_URL: &str = "OLLAMA_API_URL";
pub const ENV_MODEL: &str = "COT_DECODING_MODEL";
pub const ENV_K: &str = "COT_DECODING_K";
pub const ENV_TEMPERATURE: &str = "COT_DECODING_TEMPERATURE";
pub const ENV_MAX_TOKENS: &str = "COT_DECODING_MAX_TOKENS";
pub const ENV_DEBUG: &str = "COT_DECODING_DEBUG";
pub const ENV_TIMEOUT_MS: &str = "COT_DECODING_TIMEOUT_MS";
pub const ENV_CONCURRENCY: &str = "COT_DECODING_CONCURRENCY";

/// Every recognised override variable, in documentation order.
pub const ENV_VARS: [&str; 8] = [
    ENV_BACKEND_URL,
    ENV_MODEL,
    ENV_K,
    ENV_TEMPERATURE,
    ENV_MAX_TOKENS,
    ENV_DEBUG,
    ENV_TIMEOUT_MS,
    ENV_CONCURRENCY,
];

/// Source of environment variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed in-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Read the override variables for every field `explicit` leaves unset.
/// Variables shadowed by an explicit value are not parsed.
pub(super) fn read_overrides(env: &dyn EnvSource, explicit: &ConfigOverrides) -> Result<ConfigOverrides, ConfigError> {
    Ok(ConfigOverrides {
        backend_url: unless(explicit.backend_url.is_some(), || Ok(env.var(ENV_BACKEND_URL)))?,
        model: unless(explicit.model.is_some(), || Ok(env.var(ENV_MODEL)))?,
        k: unless(explicit.k.is_some(), || parse_var(env, ENV_K))?,
        temperature: unless(explicit.temperature.is_some(), || parse_var(env, ENV_TEMPERATURE))?,
        max_tokens: unless(explicit.max_tokens.is_some(), || parse_var(env, ENV_MAX_TOKENS))?,
        debug: unless(explicit.debug.is_some(), || parse_bool_var(env, ENV_DEBUG))?,
        request_timeout_ms: unless(explicit.request_timeout_ms.is_some(), || parse_var(env, ENV_TIMEOUT_MS))?,
        max_concurrency: unless(explicit.max_concurrency.is_some(), || parse_var(env, ENV_CONCURRENCY))?,
    })
}

fn unless<T>(
    shadowed: bool,
    read: impl FnOnce() -> Result<Option<T>, ConfigError>,
) -> Result<Option<T>, ConfigError> {
    if shadowed {
        Ok(None)
    } else {
        read()
    }
}

fn parse_var<T>(env: &dyn EnvSource, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env.var(var) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| ConfigError::InvalidEnv {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_bool_var(env: &dyn EnvSource, var: &'static str) -> Result<Option<bool>, ConfigError> {
    match env.var(var) {
        None => Ok(None),
        Some(raw) => parse_bool(&raw).map(Some).ok_or_else(|| ConfigError::InvalidEnv {
            var,
            value: raw.clone(),
            reason: "expected true or false".to_string(),
        }),
    }
}

/// Case-insensitive `true`/`false`; anything else is rejected.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
