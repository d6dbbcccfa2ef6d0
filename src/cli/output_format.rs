//! Formatting helpers for decode command output.

use crate::engine::{Candidate, SelectionResult};

/// Print the per-candidate table for a finished selection.
pub fn print_candidate_table(selection: &SelectionResult) {
    let winner = selection.winner().map(|c| c.index);
    println!("\nCandidates ({} sampled, {} failed)", selection.candidates().len(), selection.failed_count());
    println!("    # | Seed   | Status | Confidence   | Content");
    println!("  ----+--------+--------+--------------+------------------------------");
    for candidate in selection.candidates() {
        println!("{}", format_row(candidate, winner == Some(candidate.index)));
    }
}

pub(crate) fn format_row(candidate: &Candidate, is_winner: bool) -> String {
    let marker = if is_winner { '*' } else { ' ' };
    let status = if candidate.is_failed() { "error" } else { "ok" };
    let confidence = candidate
        .confidence()
        .map(|c| format!("{:.6e}", c))
        .unwrap_or_else(|| "n/a".to_string());
    let detail = match (candidate.content(), candidate.error()) {
        (_, Some(err)) => err.to_string(),
        (Some(text), None) => text.to_string(),
        (None, None) => String::new(),
    };
    format!(
        "{} {:>3} | {:<6} | {:<6} | {:<12} | {}",
        marker,
        candidate.index,
        candidate.seed,
        status,
        confidence,
        truncate(&single_line(&detail), 30)
    )
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters, ending in `...` when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
