//! Diagnostic trace of one decoding invocation.
//!
//! A trace is a read-only projection of the formatted prompt and the
//! `SelectionResult`. It renders as the human-readable debug section and
//! exports as JSON.

use std::fmt;

use serde::Serialize;

use super::candidate_types::{Candidate, SelectionResult};

/// Notice rendered in place of a winner when every candidate failed.
pub const TOTAL_FAILURE_NOTICE: &str = "No candidate succeeded; no response was selected.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub index: usize,
    pub seed: u64,
    pub content: Option<String>,
    pub error: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceWinner {
    pub index: usize,
    pub content: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub prompt: String,
    pub candidates: Vec<TraceEntry>,
    /// `None` on total failure.
    pub winner: Option<TraceWinner>,
}

impl Trace {
    pub fn assemble(prompt: &str, selection: &SelectionResult) -> Self {
        let winner = selection.winner().and_then(|c| {
            Some(TraceWinner {
                index: c.index,
                content: c.content()?.to_string(),
                confidence: c.confidence()?,
            })
        });
        Self {
            prompt: prompt.to_string(),
            candidates: selection.candidates().iter().map(entry_for).collect(),
            winner,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn entry_for(candidate: &Candidate) -> TraceEntry {
    TraceEntry {
        index: candidate.index,
        seed: candidate.seed,
        content: candidate.content().map(str::to_string),
        error: candidate.error().map(|e| e.to_string()),
        confidence: candidate.confidence(),
    }
}

struct Score(Option<f64>);

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "n/a"),
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Debug Info ---")?;
        writeln!(f, "Formatted Prompt:")?;
        writeln!(f, "{}", self.prompt)?;
        writeln!(f)?;
        for entry in &self.candidates {
            writeln!(f, "Response {} (seed {}):", entry.index + 1, entry.seed)?;
            match (&entry.content, &entry.error) {
                (_, Some(error)) => writeln!(f, "Error: {}", error)?,
                (Some(content), None) => writeln!(f, "Content: {}", content)?,
                (None, None) => writeln!(f, "Content: ")?,
            }
            writeln!(f, "Confidence: {}", Score(entry.confidence))?;
            writeln!(f)?;
        }
        match &self.winner {
            Some(w) => {
                writeln!(f, "Selected Response {}:", w.index + 1)?;
                writeln!(f, "Content: {}", w.content)?;
                write!(f, "Confidence: {}", w.confidence)
            }
            None => write!(f, "{}", TOTAL_FAILURE_NOTICE),
        }
    }
}

#[cfg(test)]
#[path = "trace_tests.rs"]
mod tests;
