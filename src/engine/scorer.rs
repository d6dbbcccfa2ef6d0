//! Confidence scoring.
//!
//! The backend does not expose token log-probabilities, so confidence is
//! generation throughput: tokens evaluated per nanosecond of evaluation.
//! It is a placeholder proxy and carries no semantic signal.

use super::candidate_types::Candidate;

/// `eval_count / eval_duration_ns`, or 0 when the duration is 0.
pub fn confidence(eval_count: u64, eval_duration_ns: u64) -> f64 {
    if eval_duration_ns == 0 {
        return 0.0;
    }
    eval_count as f64 / eval_duration_ns as f64
}

/// Score every successful candidate in place. Failed candidates stay unscored.
pub fn score_candidates(candidates: &mut [Candidate]) {
    for candidate in candidates.iter_mut() {
        if let Some(generation) = candidate.generation_mut() {
            generation.confidence = Some(confidence(generation.eval_count, generation.eval_duration_ns));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::candidate_types::CandidateError;

    #[test]
    fn test_tokens_per_nanosecond() {
        let c = confidence(100, 1_000_000);
        assert!((c - 0.0001).abs() < 1e-12);
    }

    #[test]
    fn test_zero_duration_scores_zero() {
        assert_eq!(confidence(100, 0), 0.0);
        assert_eq!(confidence(0, 0), 0.0);
    }

    #[test]
    fn test_failed_candidates_stay_unscored() {
        let mut candidates = vec![
            Candidate::generated(0, 0, "a".into(), 50, 100),
            Candidate::failed(1, 1, CandidateError::EmptyCompletion),
            Candidate::generated(2, 2, "c".into(), 5, 0),
        ];
        score_candidates(&mut candidates);

        assert_eq!(candidates[0].confidence(), Some(0.5));
        assert_eq!(candidates[1].confidence(), None);
        assert_eq!(candidates[2].confidence(), Some(0.0));
        assert!(candidates[2].error().is_none());
    }
}
