//! Vulnerability item model.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether an item records an ongoing hardship or a stated need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VulnerabilityKind {
    Risk,
    Desire,
}

/// Severity scores produced by the scored judgment path.
///
/// Ranges: `urgency` 0..=3, `adl` 0..=4, `guardian` 0..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityScores {
    pub urgency: u8,
    pub adl: u8,
    pub guardian: u8,
}

impl SeverityScores {
    pub const MAX_URGENCY: u8 = 3;
    pub const MAX_ADL: u8 = 4;
    pub const MAX_GUARDIAN: u8 = 4;

    pub fn new(urgency: u8, adl: u8, guardian: u8) -> Self {
        Self {
            urgency,
            adl,
            guardian,
        }
    }

    /// Conservative scores used when the judge cannot be reached or its
    /// output cannot be decoded.
    pub fn fallback() -> Self {
        Self::new(1, 1, 2)
    }

    /// Returns true when every score lies within its documented range.
    pub fn is_in_range(&self) -> bool {
        self.urgency <= Self::MAX_URGENCY
            && self.adl <= Self::MAX_ADL
            && self.guardian <= Self::MAX_GUARDIAN
    }
}

/// A single entry in a risk or desire list.
///
/// Identity is `content` (exact, case-sensitive). Items are never edited in
/// place; the registry only appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityItem {
    pub content: String,
    #[serde(default)]
    pub category_indices: Vec<u32>,
    pub kind: VulnerabilityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_scores: Option<SeverityScores>,
}

impl VulnerabilityItem {
    pub fn risk(content: impl Into<String>, category_indices: Vec<u32>) -> Self {
        Self {
            content: content.into(),
            category_indices,
            kind: VulnerabilityKind::Risk,
            severity_scores: None,
        }
    }

    pub fn desire(content: impl Into<String>, category_indices: Vec<u32>) -> Self {
        Self {
            content: content.into(),
            category_indices,
            kind: VulnerabilityKind::Desire,
            severity_scores: None,
        }
    }

    pub fn with_scores(mut self, scores: SeverityScores) -> Self {
        self.severity_scores = Some(scores);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_scores_are_in_range() {
        assert!(SeverityScores::fallback().is_in_range());
        assert!(!SeverityScores::new(4, 0, 0).is_in_range());
        assert!(!SeverityScores::new(0, 5, 0).is_in_range());
    }

    #[test]
    fn test_kind_round_trips_through_strum() {
        assert_eq!(VulnerabilityKind::Desire.to_string(), "desire");
        assert_eq!(
            "risk".parse::<VulnerabilityKind>().unwrap(),
            VulnerabilityKind::Risk
        );
    }
}
