//! Classification outcome types.

use super::categories::{NEED_HUMAN_REQUESTED, NEED_HUMAN_SEVERE};
use crate::registry::{SeverityScores, VulnerabilityItem};
use serde::{Deserialize, Serialize};

/// Reason attached to conservative scores when the judge failed.
pub const ANALYSIS_FAILED_REASON: &str = "analysis failed";

/// Outcome of classifying a single answer. Exactly one per answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassificationResult {
    /// Caller-side failure that ends the interview.
    Exception { reason: String, fail_code: u32 },
    /// The caller asked for (or clearly needs) a human counselor.
    Escalation { reason: String },
    /// A known risk keyword matched.
    Risk { category: String, category_index: u32 },
    /// A known desire keyword matched.
    Desire { category: String, category_index: u32 },
    /// Scores from the external judge.
    Scored {
        scores: SeverityScores,
        reason: String,
    },
    /// Nothing could be read from the answer (e.g. blank transcription).
    Unclassifiable,
}

/// Cut-off tier of a scored judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    /// Immediate intervention; behaves like `Escalation`.
    Critical,
    /// Register as a risk.
    Caution,
    /// Register as a general desire.
    Benign,
}

impl SeverityTier {
    /// Applies the cut-off rule.
    ///
    /// - `urgency >= 3` or (`adl >= 4` and `guardian >= 4`) is critical
    /// - `urgency >= 1` or `adl >= 3` or `guardian >= 3` is caution
    /// - anything else is benign
    pub fn from_scores(scores: &SeverityScores) -> Self {
        if scores.urgency >= 3 || (scores.adl >= 4 && scores.guardian >= 4) {
            Self::Critical
        } else if scores.urgency >= 1 || scores.adl >= 3 || scores.guardian >= 3 {
            Self::Caution
        } else {
            Self::Benign
        }
    }
}

/// Category indices used when a scored judgment names no category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefaults {
    pub risk: u32,
    pub desire: u32,
}

impl Default for CategoryDefaults {
    fn default() -> Self {
        // "기타" in both tables
        Self { risk: 8, desire: 11 }
    }
}

impl ClassificationResult {
    pub fn is_exception(&self) -> bool {
        matches!(self, Self::Exception { .. })
    }

    /// Tier of a scored result; `None` for keyword results.
    pub fn tier(&self) -> Option<SeverityTier> {
        match self {
            Self::Scored { scores, .. } => Some(SeverityTier::from_scores(scores)),
            _ => None,
        }
    }

    /// The `need_human` level this result implies (0 when none).
    pub fn escalation_level(&self) -> u8 {
        match self {
            Self::Escalation { .. } => NEED_HUMAN_REQUESTED,
            Self::Scored { .. } if self.tier() == Some(SeverityTier::Critical) => {
                NEED_HUMAN_SEVERE
            }
            _ => 0,
        }
    }

    /// The registry item this result contributes, if any.
    ///
    /// Critical and caution scores land in the risk list; benign scores in
    /// the desire list. Scored items keep their scores.
    pub fn registry_item(&self, defaults: CategoryDefaults) -> Option<VulnerabilityItem> {
        match self {
            Self::Risk {
                category,
                category_index,
            } => Some(VulnerabilityItem::risk(category.clone(), vec![*category_index])),
            Self::Desire {
                category,
                category_index,
            } => Some(VulnerabilityItem::desire(
                category.clone(),
                vec![*category_index],
            )),
            Self::Scored { scores, reason } => {
                let content = scored_content(reason, scores);
                let item = match SeverityTier::from_scores(scores) {
                    SeverityTier::Critical | SeverityTier::Caution => {
                        VulnerabilityItem::risk(content, vec![defaults.risk])
                    }
                    SeverityTier::Benign => {
                        VulnerabilityItem::desire(content, vec![defaults.desire])
                    }
                };
                Some(item.with_scores(*scores))
            }
            Self::Exception { .. } | Self::Escalation { .. } | Self::Unclassifiable => None,
        }
    }
}

/// Content of a scored registry item, e.g.
/// `허리 통증 호소 [긴급성(1), 일상생활(3), 보호자(0)]`.
pub fn scored_content(reason: &str, scores: &SeverityScores) -> String {
    format!(
        "{} [긴급성({}), 일상생활({}), 보호자({})]",
        reason.trim(),
        scores.urgency,
        scores.adl,
        scores.guardian
    )
}
