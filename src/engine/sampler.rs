//! Candidate sampler: one backend request per decoding path.
//!
//! Requests run through an order-preserving buffered stream, so at most
//! `max_concurrency` are in flight and the output is always in index order.
//! A failing request becomes a failed `Candidate`; it never cancels siblings.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use super::candidate_types::{Candidate, CandidateError};
use crate::backend::{GenerateOptions, GenerateRequest, GenerationBackend};
use crate::config::DecodingConfig;

/// Seed for the candidate at `index`. Fixed per index so a batch of `k` is
/// reproducible.
pub fn seed_for(index: usize) -> u64 {
    index as u64
}

pub struct CandidateSampler<'a, B: GenerationBackend + ?Sized> {
    backend: &'a B,
    config: &'a DecodingConfig,
}

impl<'a, B: GenerationBackend + ?Sized> CandidateSampler<'a, B> {
    pub fn new(backend: &'a B, config: &'a DecodingConfig) -> Self {
        Self { backend, config }
    }

    /// Sample exactly `config.k` candidates for `prompt`.
    pub async fn sample(&self, prompt: &str) -> Vec<Candidate> {
        let concurrency = self.config.max_concurrency.max(1);
        stream::iter(0..self.config.k)
            .map(|index| self.sample_one(prompt, index))
            .buffered(concurrency)
            .collect()
            .await
    }

    async fn sample_one(&self, prompt: &str, index: usize) -> Candidate {
        let seed = seed_for(index);
        let request = self.build_request(prompt, seed);
        let timeout_ms = self.config.request_timeout_ms;

        metrics::counter!("cot_candidates_total").increment(1);
        let result = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.backend.generate(&request),
        )
        .await;

        let candidate = match result {
            Err(_) => Candidate::failed(index, seed, CandidateError::Timeout { timeout_ms }),
            Ok(Err(e)) => Candidate::failed(index, seed, CandidateError::Backend(e)),
            Ok(Ok(response)) => match (response.eval_count, response.eval_duration) {
                (None, _) => Candidate::failed(index, seed, CandidateError::MissingStatistics("eval_count")),
                (_, None) => Candidate::failed(index, seed, CandidateError::MissingStatistics("eval_duration")),
                _ if response.response.is_empty() => {
                    Candidate::failed(index, seed, CandidateError::EmptyCompletion)
                }
                (Some(count), Some(duration)) => {
                    Candidate::generated(index, seed, response.response, count, duration)
                }
            },
        };

        if let Some(err) = candidate.error() {
            metrics::counter!("cot_candidate_failures_total", "reason" => err.kind()).increment(1);
            tracing::warn!(index, seed, error = %err, "Candidate generation failed");
        } else {
            tracing::debug!(
                index,
                seed,
                eval_count = candidate.eval_count(),
                eval_duration_ns = candidate.eval_duration_ns(),
                "Candidate generated"
            );
        }
        candidate
    }

    fn build_request(&self, prompt: &str, seed: u64) -> GenerateRequest {
        GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
                seed,
            },
            stream: false,
        }
    }
}

#[cfg(test)]
#[path = "sampler_tests.rs"]
mod tests;
