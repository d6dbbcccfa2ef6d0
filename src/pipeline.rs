//! Host-facing decoding pipeline.
//!
//! One `pipe` call is one independent invocation: configuration is resolved
//! and validated first, then the prompt is formatted, candidates are
//! sampled, scored and selected, and a trace is assembled when debug is on.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::backend::GenerationBackend;
use crate::config::{ConfigError, ConfigOverrides, DecodingConfig, EnvSource, ProcessEnv};
use crate::engine::{format_prompt, score_candidates, select, CandidateSampler, Conversation, SelectionResult, Trace};

pub const PIPELINE_NAME: &str = "CoT-Decoding Pipeline";

/// Message returned to the host when no candidate could be produced.
pub const TOTAL_FAILURE_MESSAGE: &str = "I'm sorry, but I couldn't generate a response.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{} All {attempts} candidate generations failed.", TOTAL_FAILURE_MESSAGE)]
    TotalFailure { attempts: usize, selection: SelectionResult, trace: Option<Trace> },
}

impl DecodeError {
    /// The error message, followed by the debug section for a total failure
    /// that carries a trace.
    pub fn render(&self) -> String {
        match self {
            DecodeError::TotalFailure { trace: Some(trace), .. } => format!("{}\n\n{}", self, trace),
            _ => self.to_string(),
        }
    }
}

/// Successful decoding result.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeOutcome {
    pub answer: String,
    pub confidence: f64,
    pub winner_index: usize,
    /// Present only when debug was enabled for the invocation.
    pub trace: Option<Trace>,
    #[serde(skip)]
    pub selection: SelectionResult,
}

impl DecodeOutcome {
    /// The answer, followed by the debug section when a trace is present.
    pub fn render(&self) -> String {
        match &self.trace {
            Some(trace) => format!("{}\n\n{}", self.answer, trace),
            None => self.answer.clone(),
        }
    }
}

/// Run one decoding pass with an already validated configuration.
pub async fn decode<B>(backend: &B, config: &DecodingConfig, conversation: &Conversation) -> Result<DecodeOutcome, DecodeError>
where
    B: GenerationBackend + ?Sized,
{
    let prompt = format_prompt(conversation);
    tracing::debug!(turns = conversation.len(), prompt_len = prompt.len(), "Formatted prompt");

    let mut candidates = CandidateSampler::new(backend, config).sample(&prompt).await;
    score_candidates(&mut candidates);
    let selection = select(candidates);
    let trace = config.debug.then(|| Trace::assemble(&prompt, &selection));
    if let Some(ref t) = trace {
        tracing::debug!(target: "cot_decoding::trace", "\n{}", t);
    }

    let Some((answer, confidence, winner_index)) = selection
        .winner()
        .and_then(|w| Some((w.content()?.to_string(), w.confidence()?, w.index)))
    else {
        metrics::counter!("cot_total_failures_total").increment(1);
        let attempts = selection.candidates().len();
        tracing::error!(attempts, "All candidates failed");
        return Err(DecodeError::TotalFailure { attempts, selection, trace });
    };

    metrics::histogram!("cot_winner_confidence").record(confidence);
    tracing::info!(
        winner = winner_index,
        confidence,
        failed = selection.failed_count(),
        candidates = selection.candidates().len(),
        "Selected decoding path"
    );
    Ok(DecodeOutcome { answer, confidence, winner_index, trace, selection })
}

/// Pipeline as seen by the hosting runtime.
pub struct Pipeline<B: GenerationBackend> {
    backend: B,
    overrides: ConfigOverrides,
    env: Arc<dyn EnvSource>,
}

impl<B: GenerationBackend> Pipeline<B> {
    pub fn new(backend: B, overrides: ConfigOverrides) -> Self {
        Self::with_env(backend, overrides, Arc::new(ProcessEnv))
    }

    pub fn with_env(backend: B, overrides: ConfigOverrides, env: Arc<dyn EnvSource>) -> Self {
        Self { backend, overrides, env }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn on_startup(&self) {
        tracing::info!(pipeline = PIPELINE_NAME, "on_startup");
    }

    pub async fn on_shutdown(&self) {
        tracing::info!(pipeline = PIPELINE_NAME, "on_shutdown");
    }

    /// Replace the caller-supplied overrides; takes effect on the next `pipe`.
    pub async fn on_config_updated(&mut self, overrides: ConfigOverrides) {
        self.overrides = overrides;
        tracing::info!(pipeline = PIPELINE_NAME, "Configuration overrides updated");
    }

    /// Resolve the configuration for one invocation.
    pub fn resolve_config(&self) -> Result<DecodingConfig, ConfigError> {
        DecodingConfig::resolve(&self.overrides, self.env.as_ref())
    }

    /// Decode one conversation. `model_id` is the host-side pipeline id and
    /// is only recorded; the backend model comes from configuration.
    pub async fn pipe(&self, model_id: &str, conversation: &Conversation) -> Result<DecodeOutcome, DecodeError> {
        let invocation = Uuid::new_v4();
        let span = tracing::info_span!("decode", %invocation, model_id);
        self.run(conversation).instrument(span).await
    }

    async fn run(&self, conversation: &Conversation) -> Result<DecodeOutcome, DecodeError> {
        let config = self.resolve_config().map_err(|e| {
            tracing::error!(error = %e, "Invalid configuration");
            e
        })?;
        tracing::info!(model = %config.model, k = config.k, concurrency = config.max_concurrency, "Starting decode");
        decode(&self.backend, &config, conversation).await
    }

    /// Host adapter: always yields a displayable string.
    pub async fn respond(&self, model_id: &str, conversation: &Conversation) -> String {
        match self.pipe(model_id, conversation).await {
            Ok(outcome) => outcome.render(),
            Err(e) => e.render(),
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
