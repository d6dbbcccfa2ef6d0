// Copyright 2024-2026 CoT-Decoding Contributors
// SPDX-License-Identifier: Apache-2.0

//! CoT-Decoding: decoding-time path selection over sampled candidates.
//!
//! For one prompt, `k` completions are sampled with distinct seeds, each is
//! scored with a confidence proxy derived from backend generation
//! statistics, and the highest-scoring completion is returned.

pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod pipeline;
pub mod telemetry;

pub use backend::{GenerationBackend, OllamaClient};
pub use config::{ConfigError, ConfigOverrides, DecodingConfig};
pub use engine::{Candidate, Conversation, Role, SelectionResult, Trace, Turn};
pub use pipeline::{decode, DecodeError, DecodeOutcome, Pipeline};
