//! Outcome report sent to the case-management backend.

use crate::case_file::{CaseReference, DesireEntry, RiskEntry};
use crate::classification::categories::{
    DEEP_REFERRAL_LABELS, EXCEPTIONS, deep_referral_label, exception_label, exception_labels,
};
use crate::registry::{VulnerabilityItem, count_by_category};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the interview ended, as reported in `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewResult {
    /// Ended for cause (`fail_code > 0`).
    Aborted,
    /// Completed, nothing requiring a counselor.
    Completed,
    /// Completed, a counselor should follow up.
    NeedsFollowUp,
}

impl InterviewResult {
    pub fn determine(fail_code: u32, need_human: u8) -> Self {
        if fail_code > 0 {
            Self::Aborted
        } else if need_human > 0 {
            Self::NeedsFollowUp
        } else {
            Self::Completed
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Aborted => 0,
            Self::Completed => 1,
            Self::NeedsFollowUp => 2,
        }
    }
}

/// One of the three vulnerability blocks of the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilitySection {
    pub risk_list: Vec<RiskEntry>,
    pub desire_list: Vec<DesireEntry>,
    pub risk_index_count: BTreeMap<u32, u32>,
    pub desire_index_count: BTreeMap<u32, u32>,
}

impl VulnerabilitySection {
    pub fn from_lists(risks: &[VulnerabilityItem], desires: &[VulnerabilityItem]) -> Self {
        Self {
            risk_list: risks
                .iter()
                .map(|item| RiskEntry {
                    risk_index_list: item.category_indices.clone(),
                    content: item.content.clone(),
                })
                .collect(),
            desire_list: desires
                .iter()
                .map(|item| DesireEntry {
                    desire_type: item.category_indices.clone(),
                    content: item.content.clone(),
                })
                .collect(),
            risk_index_count: count_by_category(risks),
            desire_index_count: count_by_category(desires),
        }
    }
}

/// Final payload of one call. Built once, at termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeReport {
    #[serde(flatten)]
    pub reference: CaseReference,
    pub overall_script: String,
    pub summary: String,
    pub result: u8,
    pub fail_code: u32,
    pub need_human: u8,
    #[serde(rename = "runtime")]
    pub runtime_seconds: u64,
    /// Local ISO-8601 time of termination.
    pub time: String,
    pub result_vulnerabilities: VulnerabilitySection,
    pub delete_vulnerabilities: VulnerabilitySection,
    pub new_vulnerabilities: VulnerabilitySection,
}

/// Makes the summary carry the labels the backend files reports under.
///
/// An aborted call whose summary names no exception label gets
/// `상담 불가: <label>`; a call needing a counselor gets ` 심층상담 필요.`
/// appended unless a deep-referral label is already present.
pub fn finalize_summary(summary: &str, fail_code: u32, need_human: u8) -> String {
    let mut summary = summary.trim().to_string();

    if fail_code > 0 && !exception_labels().any(|label| summary.contains(label)) {
        let label = exception_label(fail_code).unwrap_or(EXCEPTIONS[0].1);
        summary = format!("상담 불가: {label}");
    }

    if deep_referral_label(need_human).is_some()
        && !DEEP_REFERRAL_LABELS.iter().any(|label| summary.contains(label))
    {
        summary.push_str(" 심층상담 필요.");
    }

    summary
}
