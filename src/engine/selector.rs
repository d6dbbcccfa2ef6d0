//! Winner selection.

use super::candidate_types::{Candidate, SelectionResult};

/// Pick the scored, error-free candidate with the strictly highest
/// confidence; the lowest index wins ties. No eligible candidate yields a
/// result without a winner.
pub fn select(candidates: Vec<Candidate>) -> SelectionResult {
    let mut best: Option<(usize, f64)> = None;
    for (pos, candidate) in candidates.iter().enumerate() {
        let Some(score) = candidate.confidence() else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((pos, score)),
        }
    }
    SelectionResult::new(best.map(|(pos, _)| pos), candidates)
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
