//! Candidate generation and selection engine.
//!
//! Formatter → Sampler → Scorer → Selector → (optional) Trace.

pub mod candidate_types;
pub mod prompt;
pub mod sampler;
pub mod scorer;
pub mod selector;
pub mod trace;

pub use candidate_types::{Candidate, CandidateError, CandidateOutcome, Generation, SelectionResult};
pub use prompt::{format_prompt, Conversation, Role, Turn};
pub use sampler::{seed_for, CandidateSampler};
pub use scorer::{confidence, score_candidates};
pub use selector::select;
pub use trace::{Trace, TraceEntry, TraceWinner, TOTAL_FAILURE_NOTICE};
