//! Conversation types and Q/A transcript formatting.

use serde::{Deserialize, Serialize};

/// Speaker of a turn. Unrecognised role strings deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
}

/// Ordered conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    pub turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn single(question: impl Into<String>) -> Self {
        Self { turns: vec![Turn::user(question)] }
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

/// Render `conversation` as a Q/A transcript ending with an `A:` cue.
///
/// Assistant turns become `A: ...`; every other role is rendered as a
/// question.
pub fn format_prompt(conversation: &Conversation) -> String {
    let mut prompt = String::new();
    for turn in &conversation.turns {
        let tag = match turn.role {
            Role::Assistant => "A",
            Role::User | Role::System | Role::Other => "Q",
        };
        prompt.push_str(tag);
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
        prompt.push('\n');
    }
    prompt.push_str("A:");
    prompt
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
