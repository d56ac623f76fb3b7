//! Recorded question/answer pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One delivered question and the caller's answer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }

    /// Script line as stored in `overall_script`.
    pub fn script_line(&self) -> String {
        format!("Q: {} A: {}", self.question, self.answer)
    }
}

/// Joins a script into the newline-separated transcript form.
pub fn render_script(script: &[ConversationTurn]) -> String {
    script
        .iter()
        .map(ConversationTurn::script_line)
        .collect::<Vec<_>>()
        .join("\n")
}
