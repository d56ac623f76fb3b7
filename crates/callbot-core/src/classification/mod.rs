//! Answer classification domain.
//!
//! # Module Structure
//!
//! - `categories`: 1-based label tables and well-known codes
//! - `result`: `ClassificationResult`, `SeverityTier` and the cut-off rule
//! - `rules`: keyword rules applied before the scored judgment

pub mod categories;
mod result;
mod rules;

pub use result::{
    ANALYSIS_FAILED_REASON, CategoryDefaults, ClassificationResult, SeverityTier, scored_content,
};
pub use rules::{CategoryKeyword, ExceptionRule, KeywordRules, contains_phrase};
