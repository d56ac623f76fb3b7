//! Case-file intake types.
//!
//! The case-management backend sends one case file per scheduled call. Item
//! shapes here are the wire shapes (`risk_index_list` / `desire_type`); they
//! are converted into [`VulnerabilityItem`]s when a session is seeded.

use crate::registry::VulnerabilityItem;
use serde::{Deserialize, Serialize};

/// Meaning of a `response_type` code in a question's expected answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Exception,
    Risk,
    Desire,
    DeepReferral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseType {
    pub response_type: u32,
    pub response_index: u32,
}

impl ResponseType {
    pub fn kind(&self) -> Option<ResponseKind> {
        match self.response_type {
            0 => Some(ResponseKind::Exception),
            1 => Some(ResponseKind::Risk),
            2 => Some(ResponseKind::Desire),
            3 => Some(ResponseKind::DeepReferral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedAnswer {
    pub text: String,
    #[serde(default)]
    pub response_type_list: Vec<ResponseType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(default)]
    pub expected_answer: Vec<ExpectedAnswer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    #[serde(default)]
    pub risk_index_list: Vec<u32>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesireEntry {
    #[serde(default, alias = "desire_index_list")]
    pub desire_type: Vec<u32>,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseVulnerabilities {
    #[serde(default)]
    pub risk_list: Vec<RiskEntry>,
    #[serde(default)]
    pub desire_list: Vec<DesireEntry>,
}

/// Identifiers echoed back in the outcome report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReference {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default, rename = "s_index")]
    pub session_index: Option<u32>,
    #[serde(default, rename = "v_id")]
    pub vulnerable_id: Option<String>,
    #[serde(default, rename = "q_id")]
    pub question_set_id: Option<String>,
}

/// Everything the backend knows about the person being called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFile {
    #[serde(flatten)]
    pub reference: CaseReference,
    #[serde(default)]
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub question_list: Vec<Question>,
    #[serde(default)]
    pub vulnerabilities: CaseVulnerabilities,
}

impl CaseFile {
    pub fn risk_items(&self) -> Vec<VulnerabilityItem> {
        self.vulnerabilities
            .risk_list
            .iter()
            .map(|entry| VulnerabilityItem::risk(entry.content.clone(), entry.risk_index_list.clone()))
            .collect()
    }

    pub fn desire_items(&self) -> Vec<VulnerabilityItem> {
        self.vulnerabilities
            .desire_list
            .iter()
            .map(|entry| VulnerabilityItem::desire(entry.content.clone(), entry.desire_type.clone()))
            .collect()
    }
}

/// Normalizes a dialable number to E.164.
///
/// - domestic `0…` becomes `+82…`
/// - eleven digits starting with `1` become `+1…`
/// - an international `00…` prefix becomes `+…`
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix("00") {
        format!("+{rest}")
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+82{rest}")
    } else {
        format!("+{digits}")
    }
}
