//! Text-generation backend seam.
//!
//! - `types`: request/response wire types and `BackendError`
//! - `ollama`: reqwest client for an Ollama-compatible HTTP backend

mod ollama;
mod types;

use async_trait::async_trait;

pub use ollama::OllamaClient;
pub use types::{BackendError, GenerateOptions, GenerateRequest, GenerateResponse};

/// A backend that turns one prompt plus sampling options into one completion.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError>;
}

#[async_trait]
impl<B: GenerationBackend + ?Sized> GenerationBackend for std::sync::Arc<B> {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        (**self).generate(request).await
    }
}
