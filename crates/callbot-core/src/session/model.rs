//! Session domain model.

use super::phase::Phase;
use super::turn::ConversationTurn;
use crate::case_file::{CaseFile, CaseReference, Question, format_phone_number};
use crate::registry::{self, VulnerabilityItem, VulnerabilityKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation state of one call.
///
/// Owned by the flow controller for the lifetime of the call; stores only
/// serialize it. `before_risk` / `before_desire` are written once, when the
/// session is seeded, and are read only for the final diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub call_key: String,
    /// False for the empty session a store returns for an unknown key.
    #[serde(default)]
    pub seeded: bool,
    #[serde(default)]
    pub turn_index: u32,
    #[serde(default)]
    pub risk_list: Vec<VulnerabilityItem>,
    #[serde(default)]
    pub desire_list: Vec<VulnerabilityItem>,
    #[serde(default)]
    pub script: Vec<ConversationTurn>,
    #[serde(default)]
    pub before_risk: Vec<VulnerabilityItem>,
    #[serde(default)]
    pub before_desire: Vec<VulnerabilityItem>,
    pub start_time: DateTime<Utc>,
    /// 0 none, 1 requested by the caller, 2 triggered by severity.
    #[serde(default)]
    pub need_human: u8,
    pub phase: Phase,
    #[serde(default)]
    pub reference: CaseReference,
    #[serde(default)]
    pub phone: String,
    /// Question list of the case file; its expected answers extend the
    /// keyword rules for this call.
    #[serde(default)]
    pub question_list: Vec<Question>,
    /// Last prompt text served, for re-serving on duplicate deliveries.
    #[serde(default)]
    pub last_prompt: Option<String>,
    #[serde(default)]
    pub last_delivery_id: Option<String>,
    #[serde(default)]
    pub silent_reprompts: u32,
}

impl Session {
    /// The well-defined empty session returned for unknown keys.
    pub fn empty(call_key: impl Into<String>) -> Self {
        Self {
            call_key: call_key.into(),
            seeded: false,
            turn_index: 0,
            risk_list: Vec::new(),
            desire_list: Vec::new(),
            script: Vec::new(),
            before_risk: Vec::new(),
            before_desire: Vec::new(),
            start_time: Utc::now(),
            need_human: 0,
            phase: Phase::Greeting,
            reference: CaseReference::default(),
            phone: String::new(),
            question_list: Vec::new(),
            last_prompt: None,
            last_delivery_id: None,
            silent_reprompts: 0,
        }
    }

    /// Creates a session from a case file, snapshotting the lists.
    pub fn seed(call_key: impl Into<String>, case_file: &CaseFile) -> Self {
        let mut session = Self::empty(call_key);

        // Dedup on the way in so the registry invariant holds from turn zero.
        for item in case_file.risk_items() {
            registry::add(&mut session.risk_list, item);
        }
        for item in case_file.desire_items() {
            registry::add(&mut session.desire_list, item);
        }

        session.before_risk = session.risk_list.clone();
        session.before_desire = session.desire_list.clone();
        session.seeded = true;
        session.reference = case_file.reference.clone();
        session.phone = format_phone_number(&case_file.phone);
        session.question_list = case_file.question_list.clone();
        session
    }

    /// Known items asked about one by one.
    pub fn known_item_count(&self) -> usize {
        self.before_risk.len()
    }

    pub fn known_item(&self, index: usize) -> Option<&VulnerabilityItem> {
        self.before_risk.get(index)
    }

    /// Merges an item into the list matching its kind. Returns true when the
    /// registry changed.
    pub fn merge(&mut self, item: VulnerabilityItem) -> bool {
        match item.kind {
            VulnerabilityKind::Risk => registry::add(&mut self.risk_list, item),
            VulnerabilityKind::Desire => registry::add(&mut self.desire_list, item),
        }
    }

    /// Raises `need_human`; it never goes down within a call.
    pub fn escalate(&mut self, level: u8) {
        self.need_human = self.need_human.max(level);
    }

    pub fn record_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.script.push(ConversationTurn::new(question, answer));
        self.turn_index += 1;
    }

    pub fn runtime_seconds(&self, now: DateTime<Utc>) -> u64 {
        (now - self.start_time).num_seconds().max(0) as u64
    }

    pub fn is_live(&self) -> bool {
        self.seeded && !self.phase.is_terminal()
    }
}
