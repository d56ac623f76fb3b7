//! Persisted session schema.

use callbot_core::case_file::{CaseReference, Question};
use callbot_core::registry::{self, SeverityScores, VulnerabilityItem, VulnerabilityKind};
use callbot_core::session::{ConversationTurn, Phase, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current schema version written by [`SessionDto::from_domain`].
pub const SESSION_DTO_VERSION: &str = "1.0.0";

fn default_version() -> String {
    SESSION_DTO_VERSION.to_string()
}

/// Stored form of a [`Session`].
///
/// Vulnerability lists are kept as raw JSON values so entries written by
/// older producers (wire-shaped `risk_index_list` / `desire_type` records,
/// bare strings) still load. See [`normalize_items`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDto {
    #[serde(default = "default_version")]
    pub schema_version: String,
    pub call_key: String,
    #[serde(default)]
    pub seeded: bool,
    #[serde(default)]
    pub turn_index: u32,
    #[serde(default)]
    pub risk_list: Vec<Value>,
    #[serde(default)]
    pub desire_list: Vec<Value>,
    #[serde(default)]
    pub script: Vec<ConversationTurn>,
    #[serde(default)]
    pub before_risk: Vec<Value>,
    #[serde(default)]
    pub before_desire: Vec<Value>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub need_human: u8,
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub reference: CaseReference,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub question_list: Vec<Question>,
    #[serde(default)]
    pub last_prompt: Option<String>,
    #[serde(default)]
    pub last_delivery_id: Option<String>,
    #[serde(default)]
    pub silent_reprompts: u32,
}

impl SessionDto {
    pub fn from_domain(session: &Session) -> Self {
        let encode = |items: &[VulnerabilityItem]| -> Vec<Value> {
            items
                .iter()
                .filter_map(|item| serde_json::to_value(item).ok())
                .collect()
        };

        Self {
            schema_version: SESSION_DTO_VERSION.to_string(),
            call_key: session.call_key.clone(),
            seeded: session.seeded,
            turn_index: session.turn_index,
            risk_list: encode(&session.risk_list),
            desire_list: encode(&session.desire_list),
            script: session.script.clone(),
            before_risk: encode(&session.before_risk),
            before_desire: encode(&session.before_desire),
            start_time: Some(session.start_time),
            need_human: session.need_human,
            phase: Some(session.phase.clone()),
            reference: session.reference.clone(),
            phone: session.phone.clone(),
            question_list: session.question_list.clone(),
            last_prompt: session.last_prompt.clone(),
            last_delivery_id: session.last_delivery_id.clone(),
            silent_reprompts: session.silent_reprompts,
        }
    }

    /// Converts into the domain model. Missing fields take their empty
    /// values; invalid list entries are dropped.
    pub fn into_domain(self) -> Session {
        let mut session = Session::empty(self.call_key);
        session.seeded = self.seeded;
        session.turn_index = self.turn_index;
        session.risk_list = normalize_items(&self.risk_list, VulnerabilityKind::Risk);
        session.desire_list = normalize_items(&self.desire_list, VulnerabilityKind::Desire);
        session.script = self.script;
        session.before_risk = normalize_items(&self.before_risk, VulnerabilityKind::Risk);
        session.before_desire = normalize_items(&self.before_desire, VulnerabilityKind::Desire);
        if let Some(start_time) = self.start_time {
            session.start_time = start_time;
        }
        session.need_human = self.need_human;
        if let Some(phase) = self.phase {
            session.phase = phase;
        }
        session.reference = self.reference;
        session.phone = self.phone;
        session.question_list = self.question_list;
        session.last_prompt = self.last_prompt;
        session.last_delivery_id = self.last_delivery_id;
        session.silent_reprompts = self.silent_reprompts;
        session
    }
}

/// Normalizes stored vulnerability entries into typed items of `kind`.
///
/// Accepted shapes:
/// - the typed form (`content`, `category_indices`, `severity_scores`)
/// - the wire forms (`risk_index_list`, `desire_type`, `desire_index_list`)
/// - a bare string, taken as the content
///
/// Entries without usable content are dropped, and the result is
/// deduplicated by content.
pub fn normalize_items(values: &[Value], kind: VulnerabilityKind) -> Vec<VulnerabilityItem> {
    let mut items = Vec::new();
    for value in values {
        match normalize_item(value, kind) {
            Some(item) => {
                registry::add(&mut items, item);
            }
            None => {
                tracing::warn!("[SessionDto] Dropping invalid {} entry: {}", kind, value);
            }
        }
    }
    items
}

fn normalize_item(value: &Value, kind: VulnerabilityKind) -> Option<VulnerabilityItem> {
    let (content, object) = match value {
        Value::String(content) => (content.clone(), None),
        Value::Object(object) => (object.get("content")?.as_str()?.to_string(), Some(object)),
        _ => return None,
    };
    if content.trim().is_empty() {
        return None;
    }

    let mut item = VulnerabilityItem {
        content,
        category_indices: Vec::new(),
        kind,
        severity_scores: None,
    };

    if let Some(object) = object {
        item.category_indices = ["category_indices", "risk_index_list", "desire_type", "desire_index_list"]
            .iter()
            .find_map(|field| object.get(*field))
            .map(category_indices)
            .unwrap_or_default();
        item.severity_scores = object
            .get("severity_scores")
            .and_then(|scores| serde_json::from_value::<SeverityScores>(scores.clone()).ok())
            .filter(SeverityScores::is_in_range);
    }

    Some(item)
}

/// Reads a category field that may be a list, a single number, or numeric
/// strings. Entries that are not positive integers contribute nothing.
fn category_indices(value: &Value) -> Vec<u32> {
    let as_index = |value: &Value| -> Option<u32> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    };

    match value {
        Value::Array(values) => values.iter().filter_map(as_index).collect(),
        other => as_index(other).into_iter().collect(),
    }
}
