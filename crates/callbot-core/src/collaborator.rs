//! External collaborator interfaces.
//!
//! Everything here is potentially blocking network I/O. Callers bound each
//! call with a timeout and apply the fallback documented on the trait.

use crate::error::Result;
use crate::registry::SeverityScores;
use crate::report::OutcomeReport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Decoded response of the scored judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredVerdict {
    pub scores: SeverityScores,
    pub reason: String,
}

/// Rates a free-text answer on the urgency / ADL / guardian scales.
///
/// Fallback on error or timeout: [`SeverityScores::fallback`] with reason
/// `"analysis failed"`.
#[async_trait]
pub trait ScoredJudge: Send + Sync {
    async fn judge(&self, answer: &str) -> Result<ScoredVerdict>;
}

/// Produces the natural-language summary of a finished call.
///
/// Fallback on error or timeout: an empty summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, script: &str) -> Result<String>;
}

/// Receives the final report of a call.
///
/// Fallback on error: the failure is logged; the call has already ended.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn deliver(&self, call_key: &str, report: &OutcomeReport) -> Result<()>;
}

/// Turns a recording reference into text.
///
/// Fallback on error or timeout: the turn is treated as silence.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, recording_url: &str) -> Result<String>;
}
