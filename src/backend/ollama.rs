//! HTTP client for an Ollama-compatible generate endpoint.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use super::types::{BackendError, GenerateRequest, GenerateResponse};
use super::GenerationBackend;

const GENERATE_PATH: &str = "/api/generate";

/// Async JSON client bound to one generate URL.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    url: String,
}

impl OllamaClient {
    /// `url` is the full generate endpoint, e.g. `http://localhost:11434/api/generate`.
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, url: url.into() })
    }

    /// Server root derived from the generate URL.
    pub fn base_url(&self) -> &str {
        let trimmed = self.url.trim_end_matches('/');
        trimmed.strip_suffix(GENERATE_PATH).unwrap_or(trimmed)
    }

    /// Probe `<base>/api/tags`. Returns `Ok(false)` on a non-success status.
    pub async fn health_check(&self) -> Result<bool, BackendError> {
        let url = format!("{}/api/tags", self.base_url());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("{}: {}", url, e)))?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        let start = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status: status.as_u16(), body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(format!("Failed to parse generate response: {}", e)))?;

        tracing::trace!(
            seed = request.options.seed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            eval_count = ?parsed.eval_count,
            "Backend generate completed"
        );
        Ok(parsed)
    }
}
