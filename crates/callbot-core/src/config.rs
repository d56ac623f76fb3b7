//! Configuration model.
//!
//! Every field has a default so a partial (or missing) `config.toml` is
//! valid. Loading and environment overrides live in the infrastructure
//! crate.

use crate::classification::{CategoryDefaults, KeywordRules, contains_phrase};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbotConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub outcome: OutcomeConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub interview: InterviewConfig,
    #[serde(default)]
    pub classifier: KeywordRules,
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Path the telephony provider posts recorded answers to.
    #[serde(default = "default_voice_path")]
    pub voice_path: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_record_max_length")]
    pub record_max_length_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            voice_path: default_voice_path(),
            language: default_language(),
            record_max_length_secs: default_record_max_length(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_voice_path() -> String {
    "/api/twilio/voice".to_string()
}

fn default_language() -> String {
    "ko-KR".to_string()
}

fn default_record_max_length() -> u32 {
    10
}

/// Bounds for every suspension point, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_store_ms")]
    pub session_store_ms: u64,
    #[serde(default = "default_judge_ms")]
    pub judge_ms: u64,
    #[serde(default = "default_summary_ms")]
    pub summary_ms: u64,
    #[serde(default = "default_transcription_ms")]
    pub transcription_ms: u64,
    #[serde(default = "default_delivery_ms")]
    pub outcome_delivery_ms: u64,
}

impl TimeoutConfig {
    pub fn session_store(&self) -> Duration {
        Duration::from_millis(self.session_store_ms)
    }

    pub fn judge(&self) -> Duration {
        Duration::from_millis(self.judge_ms)
    }

    pub fn summary(&self) -> Duration {
        Duration::from_millis(self.summary_ms)
    }

    pub fn transcription(&self) -> Duration {
        Duration::from_millis(self.transcription_ms)
    }

    pub fn outcome_delivery(&self) -> Duration {
        Duration::from_millis(self.outcome_delivery_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            session_store_ms: default_store_ms(),
            judge_ms: default_judge_ms(),
            summary_ms: default_summary_ms(),
            transcription_ms: default_transcription_ms(),
            outcome_delivery_ms: default_delivery_ms(),
        }
    }
}

fn default_store_ms() -> u64 {
    2_000
}

fn default_judge_ms() -> u64 {
    8_000
}

fn default_summary_ms() -> u64 {
    10_000
}

fn default_transcription_ms() -> u64 {
    10_000
}

fn default_delivery_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Usually supplied through `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            temperature: default_temperature(),
        }
    }
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeConfig {
    #[serde(default = "default_outcome_url")]
    pub url: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            url: default_outcome_url(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_outcome_url() -> String {
    "http://localhost:8080/api/consult/result".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Gateway that turns a recording URL into text. Without it only
    /// provider-side speech results are accepted.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: StorageKind,
    /// Directory for the file store; defaults to `<data_dir>/callbot/sessions`.
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_max_silent_reprompts")]
    pub max_silent_reprompts: u32,
    #[serde(default)]
    pub default_categories: CategoryDefaults,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_silent_reprompts: default_max_silent_reprompts(),
            default_categories: CategoryDefaults::default(),
        }
    }
}

fn default_max_turns() -> u32 {
    40
}

fn default_max_silent_reprompts() -> u32 {
    2
}

/// Yes/no reading of a short answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Yes,
    No,
    Unclear,
}

/// Word lists for the controller's yes/no, resolution and "nothing more"
/// heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default = "default_affirmative")]
    pub affirmative: Vec<String>,
    #[serde(default = "default_negative")]
    pub negative: Vec<String>,
    /// "No thanks" words: a refusal when something is offered, agreement
    /// when asked to end the call.
    #[serde(default = "default_polite")]
    pub polite: Vec<String>,
    #[serde(default = "default_resolved")]
    pub resolved: Vec<String>,
    /// Answers that mean "resolved" only when they are the whole answer
    /// ("없어요", but not "돈이 없어요").
    #[serde(default = "default_resolved_answers")]
    pub resolved_answers: Vec<String>,
    /// Markers that cancel a resolved reading ("해결 안 됐어요").
    #[serde(default = "default_unresolved")]
    pub unresolved: Vec<String>,
    #[serde(default = "default_nothing_more")]
    pub nothing_more: Vec<String>,
    /// Longest answer (non-whitespace characters) still read as "nothing
    /// more"; longer answers are treated as a complaint.
    #[serde(default = "default_brief_answer_chars")]
    pub brief_answer_chars: usize,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            affirmative: default_affirmative(),
            negative: default_negative(),
            polite: default_polite(),
            resolved: default_resolved(),
            resolved_answers: default_resolved_answers(),
            unresolved: default_unresolved(),
            nothing_more: default_nothing_more(),
            brief_answer_chars: default_brief_answer_chars(),
        }
    }
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_affirmative() -> Vec<String> {
    words(&["네", "예", "응", "그래", "좋아", "원해", "부탁", "맞아", "종료"])
}

fn default_negative() -> Vec<String> {
    words(&["아니", "아뇨", "싫어", "안 괜찮", "필요 없", "안 해", "잠깐", "더 있"])
}

fn default_polite() -> Vec<String> {
    words(&["괜찮"])
}

fn default_resolved() -> Vec<String> {
    words(&["해결", "괜찮", "나아졌", "좋아졌", "없어졌", "문제없"])
}

fn default_resolved_answers() -> Vec<String> {
    words(&["없어", "없어요", "없다", "없습니다", "이제 없어요", "지금은 없어요"])
}

fn default_unresolved() -> Vec<String> {
    words(&[
        "안 됐", "안 되", "못 했", "아직", "여전히", "그대로", "안 괜찮", "안 나아", "못 나아",
        "안 좋아", "지 않", "해결 안", "해결이 안",
    ])
}

fn default_nothing_more() -> Vec<String> {
    words(&["없", "아니", "괜찮", "됐어", "그만"])
}

fn default_brief_answer_chars() -> usize {
    10
}

fn any_phrase(text: &str, list: &[String]) -> bool {
    list.iter().any(|phrase| contains_phrase(text, phrase))
}

/// Letters and digits only, so "없어요." and "없어 요" compare equal.
fn bare(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

impl Vocabulary {
    /// Reading of an answer to an offer. Negative and polite words win over
    /// affirmative ones ("네, 괜찮아요" declines).
    pub fn intent(&self, answer: &str) -> Intent {
        if any_phrase(answer, &self.negative) || any_phrase(answer, &self.polite) {
            Intent::No
        } else if any_phrase(answer, &self.affirmative) {
            Intent::Yes
        } else {
            Intent::Unclear
        }
    }

    /// Reading of an answer to "may we end the call?". Polite words agree
    /// ("네, 괜찮아요"); negative words still win.
    pub fn consent(&self, answer: &str) -> Intent {
        if any_phrase(answer, &self.negative) {
            Intent::No
        } else if any_phrase(answer, &self.affirmative) || any_phrase(answer, &self.polite) {
            Intent::Yes
        } else {
            Intent::Unclear
        }
    }

    /// Whether the caller says a known problem is no longer present.
    pub fn is_resolved(&self, answer: &str) -> bool {
        if any_phrase(answer, &self.unresolved) {
            return false;
        }
        let whole = bare(answer);
        any_phrase(answer, &self.resolved)
            || (!whole.is_empty() && self.resolved_answers.iter().any(|a| bare(a) == whole))
    }

    /// Whether the caller has nothing more to add.
    pub fn is_nothing_more(&self, answer: &str) -> bool {
        let length = answer.chars().filter(|c| !c.is_whitespace()).count();
        length <= self.brief_answer_chars && any_phrase(answer, &self.nothing_more)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CallbotConfig = toml::from_str(
            r#"
            [server]
            bind = "127.0.0.1:9000"

            [interview]
            max_turns = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.server.voice_path, "/api/twilio/voice");
        assert_eq!(config.interview.max_turns, 10);
        assert_eq!(config.interview.default_categories.risk, 8);
        assert_eq!(config.classifier.exception_rules.len(), 6);
        assert_eq!(config.storage.kind, StorageKind::Memory);
    }

    #[test]
    fn test_resolution_heuristic() {
        let vocabulary = Vocabulary::default();
        assert!(vocabulary.is_resolved("해결됐어요"));
        assert!(vocabulary.is_resolved("이제 괜찮아요"));
        assert!(!vocabulary.is_resolved("아직 해결 안 됐어요"));
        assert!(!vocabulary.is_resolved("월세가 밀렸어요"));
        assert!(vocabulary.is_resolved("없어요."));
        assert!(vocabulary.is_resolved("이제 없어요"));
    }

    #[test]
    fn test_negated_answers_are_not_resolved() {
        let vocabulary = Vocabulary::default();
        assert!(!vocabulary.is_resolved("안 괜찮아요"));
        assert!(!vocabulary.is_resolved("별로 안 나아졌어요"));
        assert!(!vocabulary.is_resolved("전혀 못 나아졌어요"));
        assert!(!vocabulary.is_resolved("괜찮지 않아요"));
        assert!(!vocabulary.is_resolved("돈이 없어요"));
        assert!(!vocabulary.is_resolved("먹을 게 없어요"));
    }

    #[test]
    fn test_intent() {
        let vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.intent("네 종료해 주세요"), Intent::Yes);
        assert_eq!(vocabulary.intent("아니요"), Intent::No);
        assert_eq!(vocabulary.intent("음..."), Intent::Unclear);
        assert_eq!(vocabulary.intent("아니요, 상담 필요 없어요"), Intent::No);
        assert_eq!(vocabulary.intent("네, 괜찮아요"), Intent::No);
    }

    #[test]
    fn test_consent_reads_polite_words_as_agreement() {
        let vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.consent("네, 괜찮아요"), Intent::Yes);
        assert_eq!(vocabulary.consent("괜찮습니다"), Intent::Yes);
        assert_eq!(vocabulary.consent("네 끊으셔도 돼요"), Intent::Yes);
        assert_eq!(vocabulary.consent("아니요, 더 있어요"), Intent::No);
        assert_eq!(vocabulary.consent("잠깐만요"), Intent::No);
        assert_eq!(vocabulary.consent("음..."), Intent::Unclear);
    }

    #[test]
    fn test_nothing_more() {
        let vocabulary = Vocabulary::default();
        assert!(vocabulary.is_nothing_more("없다"));
        assert!(vocabulary.is_nothing_more("딱히 없어요"));
        assert!(!vocabulary.is_nothing_more("허리가 아파요"));
        assert!(!vocabulary.is_nothing_more("허리가 아픈데 도와줄 사람이 없어요"));
    }
}
