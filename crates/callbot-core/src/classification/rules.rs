//! Keyword rules consulted before the scored judgment.

use super::categories::{
    DEEP_REFERRAL_LABELS, EXCEPTIONS, NEED_HUMAN_REQUESTED, deep_referral_label, desire_label,
    risk_label,
};
use super::result::ClassificationResult;
use crate::case_file::{Question, ResponseKind};
use serde::{Deserialize, Serialize};

/// One exception reason. Its 1-based position in
/// [`KeywordRules::exception_rules`] is the reported `fail_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRule {
    pub label: String,
    #[serde(default)]
    pub phrases: Vec<String>,
}

/// A phrase that maps an answer straight onto a registry category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeyword {
    pub phrase: String,
    pub content: String,
    pub category_index: u32,
}

/// The fast, rule-based part of answer classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRules {
    #[serde(default = "default_exception_rules")]
    pub exception_rules: Vec<ExceptionRule>,
    #[serde(default = "default_deep_referral")]
    pub deep_referral: Vec<String>,
    #[serde(default = "default_risk_keywords")]
    pub risk_keywords: Vec<CategoryKeyword>,
    #[serde(default)]
    pub desire_keywords: Vec<CategoryKeyword>,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self {
            exception_rules: default_exception_rules(),
            deep_referral: default_deep_referral(),
            risk_keywords: default_risk_keywords(),
            desire_keywords: Vec::new(),
        }
    }
}

/// Substring match that ignores whitespace on both sides, so spacing
/// differences in transcriptions ("상담 거부" vs "상담거부") still match.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let phrase: String = phrase.chars().filter(|c| !c.is_whitespace()).collect();
    if phrase.is_empty() {
        return false;
    }
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    text.contains(&phrase)
}

impl KeywordRules {
    /// Step 1: exception keywords. Labels themselves count as phrases.
    pub fn match_exception(&self, answer: &str) -> Option<ClassificationResult> {
        self.exception_rules
            .iter()
            .enumerate()
            .find(|(_, rule)| {
                contains_phrase(answer, &rule.label)
                    || rule.phrases.iter().any(|p| contains_phrase(answer, p))
            })
            .map(|(position, rule)| ClassificationResult::Exception {
                reason: rule.label.clone(),
                fail_code: position as u32 + 1,
            })
    }

    /// Step 2: deep-referral keywords.
    pub fn match_deep_referral(&self, answer: &str) -> Option<ClassificationResult> {
        self.deep_referral
            .iter()
            .any(|phrase| contains_phrase(answer, phrase))
            .then(|| ClassificationResult::Escalation {
                reason: deep_referral_label(NEED_HUMAN_REQUESTED)
                    .unwrap_or(DEEP_REFERRAL_LABELS[0])
                    .to_string(),
            })
    }

    /// Step 3: known risk keywords, then known desire keywords.
    pub fn match_category(&self, answer: &str) -> Option<ClassificationResult> {
        if let Some(keyword) = self
            .risk_keywords
            .iter()
            .find(|k| contains_phrase(answer, &k.phrase))
        {
            return Some(ClassificationResult::Risk {
                category: keyword.content.clone(),
                category_index: keyword.category_index,
            });
        }
        self.desire_keywords
            .iter()
            .find(|k| contains_phrase(answer, &k.phrase))
            .map(|keyword| ClassificationResult::Desire {
                category: keyword.content.clone(),
                category_index: keyword.category_index,
            })
    }

    /// Adds the expected answers of a case file's question list as phrases.
    ///
    /// Exception entries attach to the existing rule at their fail code so
    /// fail codes stay stable; unknown fail codes are ignored.
    pub fn extend_from_questions(&mut self, questions: &[Question]) {
        for expected in questions.iter().flat_map(|q| q.expected_answer.iter()) {
            let phrase = expected.text.trim();
            if phrase.is_empty() {
                continue;
            }
            for response in &expected.response_type_list {
                let index = response.response_index;
                match response.kind() {
                    Some(ResponseKind::Exception) => {
                        let rule = usize::try_from(index)
                            .ok()
                            .and_then(|i| i.checked_sub(1))
                            .and_then(|i| self.exception_rules.get_mut(i));
                        if let Some(rule) = rule {
                            rule.phrases.push(phrase.to_string());
                        }
                    }
                    Some(ResponseKind::Risk) => self.risk_keywords.push(CategoryKeyword {
                        phrase: phrase.to_string(),
                        content: risk_label(index).unwrap_or(phrase).to_string(),
                        category_index: index,
                    }),
                    Some(ResponseKind::Desire) => self.desire_keywords.push(CategoryKeyword {
                        phrase: phrase.to_string(),
                        content: desire_label(index).unwrap_or(phrase).to_string(),
                        category_index: index,
                    }),
                    Some(ResponseKind::DeepReferral) => {
                        self.deep_referral.push(phrase.to_string())
                    }
                    None => {
                        tracing::debug!(
                            "[KeywordRules] Ignoring unknown response_type {} for '{}'",
                            response.response_type,
                            phrase
                        );
                    }
                }
            }
        }
    }
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_exception_rules() -> Vec<ExceptionRule> {
    EXCEPTIONS
        .iter()
        .map(|(_, label, extra)| ExceptionRule {
            label: label.to_string(),
            phrases: phrases(extra),
        })
        .collect()
}

fn default_deep_referral() -> Vec<String> {
    phrases(&[
        "심층상담",
        "상담사 연결",
        "상담원 연결",
        "상담사랑 통화",
        "사람이랑 통화",
        "직접 찾아와",
    ])
}

fn default_risk_keywords() -> Vec<CategoryKeyword> {
    let table: &[(&str, u32)] = &[
        ("요금이 밀", 1),
        ("체납", 1),
        ("월세", 2),
        ("쫓겨나", 2),
        ("집이 없", 2),
        ("일자리", 3),
        ("실직", 3),
        ("수급 탈락", 4),
        ("쓰러졌", 5),
        ("병원비", 6),
        ("난방", 7),
        ("전기가 끊", 7),
    ];
    table
        .iter()
        .map(|(phrase, index)| CategoryKeyword {
            phrase: phrase.to_string(),
            content: risk_label(*index).unwrap_or("기타").to_string(),
            category_index: *index,
        })
        .collect()
}
