//! Wire types for the generation backend (Ollama `/api/generate`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("HTTP {status} from backend: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed backend response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Transport(_) => "transport",
            BackendError::Status { .. } => "status",
            BackendError::Malformed(_) => "malformed",
        }
    }
}

/// Non-streaming generate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub options: GenerateOptions,
    #[serde(default)]
    pub stream: bool,
}

/// Sampling options. `num_predict` is the backend's name for max tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub num_predict: u32,
    pub seed: u64,
}

/// Generate response. Timing statistics are optional on the wire; their
/// absence is reported by the sampler, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    /// Tokens generated.
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Time spent generating, in nanoseconds.
    #[serde(default)]
    pub eval_duration: Option<u64>,
}
