//! Candidate and selection types shared by the sampler, scorer, selector
//! and trace assembler.

use serde::Serialize;
use thiserror::Error;

use crate::backend::BackendError;

/// Why a single candidate produced no usable completion.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(into = "String")]
pub enum CandidateError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Response missing generation statistic: {0}")]
    MissingStatistics(&'static str),

    #[error("Backend returned an empty completion")]
    EmptyCompletion,
}

impl CandidateError {
    pub fn kind(&self) -> &'static str {
        match self {
            CandidateError::Backend(e) => e.kind(),
            CandidateError::Timeout { .. } => "timeout",
            CandidateError::MissingStatistics(_) => "missing_statistics",
            CandidateError::EmptyCompletion => "empty_completion",
        }
    }

    /// The backend could not be reached or did not answer in time.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            CandidateError::Backend(BackendError::Transport(_)) | CandidateError::Timeout { .. }
        )
    }
}

impl From<CandidateError> for String {
    fn from(e: CandidateError) -> Self {
        e.to_string()
    }
}

/// A successful completion and its generation statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub content: String,
    /// Tokens evaluated.
    pub eval_count: u64,
    pub eval_duration_ns: u64,
    /// Set by the scorer.
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CandidateOutcome {
    Generated(Generation),
    Failed { error: CandidateError },
}

/// One sampled decoding path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub index: usize,
    pub seed: u64,
    pub outcome: CandidateOutcome,
}

impl Candidate {
    pub fn generated(index: usize, seed: u64, content: String, eval_count: u64, eval_duration_ns: u64) -> Self {
        Self {
            index,
            seed,
            outcome: CandidateOutcome::Generated(Generation {
                content,
                eval_count,
                eval_duration_ns,
                confidence: None,
            }),
        }
    }

    pub fn failed(index: usize, seed: u64, error: CandidateError) -> Self {
        Self { index, seed, outcome: CandidateOutcome::Failed { error } }
    }

    pub fn content(&self) -> Option<&str> {
        self.generation().map(|g| g.content.as_str())
    }

    pub fn eval_count(&self) -> u64 {
        self.generation().map_or(0, |g| g.eval_count)
    }

    pub fn eval_duration_ns(&self) -> u64 {
        self.generation().map_or(0, |g| g.eval_duration_ns)
    }

    /// `None` for failed or not-yet-scored candidates.
    pub fn confidence(&self) -> Option<f64> {
        self.generation().and_then(|g| g.confidence)
    }

    pub fn error(&self) -> Option<&CandidateError> {
        match &self.outcome {
            CandidateOutcome::Failed { error } => Some(error),
            CandidateOutcome::Generated(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error().is_some()
    }

    pub fn generation(&self) -> Option<&Generation> {
        match &self.outcome {
            CandidateOutcome::Generated(g) => Some(g),
            CandidateOutcome::Failed { .. } => None,
        }
    }

    pub(crate) fn generation_mut(&mut self) -> Option<&mut Generation> {
        match &mut self.outcome {
            CandidateOutcome::Generated(g) => Some(g),
            CandidateOutcome::Failed { .. } => None,
        }
    }
}

/// Result of selection over one batch, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    winner: Option<usize>,
    candidates: Vec<Candidate>,
}

impl SelectionResult {
    pub(crate) fn new(winner: Option<usize>, candidates: Vec<Candidate>) -> Self {
        Self { winner, candidates }
    }

    pub fn winner(&self) -> Option<&Candidate> {
        self.winner.and_then(|pos| self.candidates.get(pos))
    }

    /// All candidates in generation order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn failed_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_failed()).count()
    }

    pub fn is_total_failure(&self) -> bool {
        self.winner.is_none()
    }

    /// Total failure where every candidate failed to reach the backend.
    pub fn is_backend_unreachable(&self) -> bool {
        self.is_total_failure()
            && !self.candidates.is_empty()
            && self.candidates.iter().all(|c| c.error().is_some_and(|e| e.is_connection()))
    }
}
