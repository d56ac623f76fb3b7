//! Interview flow controller.
//!
//! Drives one call turn by turn:
//!
//! ```text
//! GREETING -> ASK_ITEM(0..n) -> ASK_ADDITIONAL <-> ASK_ADDITIONAL_DETAIL
//!                 |   ^              |                  |
//!                 v   |              v                  v
//!              OFFER_HELP        CONFIRM_END -> TERMINATED
//!
//! any asking phase -> EXCEPTION_TERMINATED
//! ```
//!
//! Each turn loads the session, applies at most one registry mutation and
//! one script append, then either persists the session and returns the
//! next question, or ends the call. Ending a call builds the report, clears
//! the session and hands the report to the sink, in that order, exactly
//! once per call key.

use crate::classifier::AnswerClassifier;
use crate::locks::CallLocks;
use crate::prompt::{self, Prompt};
use crate::report_builder::ReportBuilder;
use callbot_core::classification::categories::{FAIL_CODE_INCOMPREHENSIBLE, NEED_HUMAN_REQUESTED};
use callbot_core::classification::{
    CategoryDefaults, ClassificationResult, KeywordRules, SeverityTier,
};
use callbot_core::collaborator::OutcomeSink;
use callbot_core::config::{CallbotConfig, Intent, Vocabulary};
use callbot_core::session::{DetailDraft, DetailStep, Phase, Session, SessionStore};
use callbot_core::{CallbotError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Limits and bounds of the controller.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub max_turns: u32,
    pub max_silent_reprompts: u32,
    pub category_defaults: CategoryDefaults,
    pub store_timeout: Duration,
    /// Bound on the whole outcome delivery, retries included.
    pub delivery_timeout: Duration,
}

impl FlowSettings {
    pub fn from_config(config: &CallbotConfig) -> Self {
        let attempts = config.outcome.max_attempts.max(1);
        let backoff = Duration::from_millis(config.outcome.backoff_ms);
        Self {
            max_turns: config.interview.max_turns,
            max_silent_reprompts: config.interview.max_silent_reprompts,
            category_defaults: config.interview.default_categories,
            store_timeout: config.timeouts.session_store(),
            delivery_timeout: config.timeouts.outcome_delivery() * attempts
                + backoff * attempts * attempts,
        }
    }
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self::from_config(&CallbotConfig::default())
    }
}

/// How a turn ends.
enum Step {
    /// The session moved to a new asking phase; speak `text`.
    Continue { text: String },
    /// The call is over.
    Finish { fail_code: u32, text: String },
}

impl Step {
    fn ask(ack: &str, session: &Session) -> Self {
        Self::Continue {
            text: prompt::join(ack, &prompt::question_for(session, &session.phase)),
        }
    }

    fn exception(fail_code: u32) -> Self {
        Self::Finish {
            fail_code,
            text: prompt::EXCEPTION_CLOSING.to_string(),
        }
    }

    fn completed() -> Self {
        Self::Finish {
            fail_code: 0,
            text: prompt::CLOSING.to_string(),
        }
    }
}

pub struct FlowController {
    store: Arc<dyn SessionStore>,
    classifier: Arc<AnswerClassifier>,
    reports: ReportBuilder,
    sink: Arc<dyn OutcomeSink>,
    vocabulary: Vocabulary,
    settings: FlowSettings,
    locks: CallLocks,
}

impl FlowController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        classifier: Arc<AnswerClassifier>,
        reports: ReportBuilder,
        sink: Arc<dyn OutcomeSink>,
        vocabulary: Vocabulary,
        settings: FlowSettings,
        locks: CallLocks,
    ) -> Self {
        Self {
            store,
            classifier,
            reports,
            sink,
            vocabulary,
            settings,
            locks,
        }
    }

    /// Handles one telephony delivery for `call_key`.
    ///
    /// `utterance` is `None` when the caller has not spoken yet (call just
    /// answered) or the recording produced nothing. A repeated
    /// `delivery_id` re-serves the previous prompt without advancing.
    pub async fn handle_turn(
        &self,
        call_key: &str,
        utterance: Option<&str>,
        delivery_id: Option<&str>,
    ) -> Prompt {
        let _guard = self.locks.lock(call_key).await;

        let mut session = match self.load(call_key).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("[FlowController] Failed to load session {}: {}", call_key, e);
                return Prompt::system_error();
            }
        };

        if !session.is_live() {
            tracing::error!(
                "[FlowController] Turn for unknown or finished call {}; ending call",
                call_key
            );
            return Prompt::system_error();
        }

        if let (Some(id), Some(last_id)) = (delivery_id, session.last_delivery_id.as_deref()) {
            if id == last_id {
                if let Some(last_prompt) = &session.last_prompt {
                    tracing::info!(
                        "[FlowController] Duplicate delivery {} for {}, re-serving last prompt",
                        id,
                        call_key
                    );
                    return Prompt::ask(last_prompt.clone());
                }
            }
        }

        match self.advance(&mut session, utterance).await {
            Step::Continue { text } => {
                session.last_prompt = Some(text.clone());
                session.last_delivery_id = delivery_id.map(str::to_string);
                if let Err(e) = self.persist(&session).await {
                    tracing::error!("[FlowController] Failed to save session {}: {}", call_key, e);
                    return Prompt::system_error();
                }
                tracing::info!(
                    "[FlowController] {} -> {} (turn {})",
                    call_key,
                    session.phase,
                    session.turn_index
                );
                Prompt::ask(text)
            }
            Step::Finish { fail_code, text } => {
                self.finish(session, fail_code).await;
                Prompt::hang_up(text)
            }
        }
    }

    /// Ends a live call because the telephony side reported it gone.
    ///
    /// Returns true when this call ended the session; false when there was
    /// no live session (already finished, or never seeded).
    pub async fn disconnect(&self, call_key: &str, fail_code: u32) -> bool {
        let _guard = self.locks.lock(call_key).await;

        let session = match self.load(call_key).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("[FlowController] Failed to load session {}: {}", call_key, e);
                return false;
            }
        };

        if !session.is_live() {
            tracing::debug!("[FlowController] Disconnect for {} ignored: no live session", call_key);
            return false;
        }

        tracing::info!(
            "[FlowController] Disconnect for {} in phase {} (fail_code {})",
            call_key,
            session.phase,
            fail_code
        );
        self.finish(session, fail_code).await;
        true
    }

    async fn advance(&self, session: &mut Session, utterance: Option<&str>) -> Step {
        let phase = session.phase.clone();

        if phase == Phase::Greeting {
            session.phase = self.item_or_additional(session, 0);
            return Step::Continue {
                text: prompt::join(
                    prompt::GREETING,
                    &prompt::question_for(session, &session.phase),
                ),
            };
        }

        let answer = utterance.map(str::trim).unwrap_or_default();
        if answer.is_empty() {
            return self.on_silence(session, &phase);
        }
        session.silent_reprompts = 0;

        let question = prompt::question_for(session, &phase);
        session.record_turn(question.as_str(), answer);
        tracing::info!(
            "[Script] {} #{} Q: {} A: {}",
            session.call_key,
            session.turn_index,
            question,
            answer
        );

        let rules = self.classifier.rules_for(&session.question_list);

        // Exceptions end the call from any asking phase, unless the answer
        // is a plain yes or no to the question just asked.
        let exception = if phase.is_asking() && !self.is_reply_to(&phase, answer) {
            rules.match_exception(answer)
        } else {
            None
        };
        if let Some(ClassificationResult::Exception { reason, fail_code }) = exception {
            tracing::info!(
                "[FlowController] Exception '{}' (fail_code {}) for {}",
                reason,
                fail_code,
                session.call_key
            );
            return Step::exception(fail_code);
        }

        let step = match phase {
            Phase::AskItem { index } => self.on_item_answer(session, &rules, index, answer).await,
            Phase::OfferHelp { next_item } => self.on_help_answer(session, &rules, next_item, answer),
            Phase::AskAdditional => self.on_additional_answer(session, &rules, answer),
            Phase::AskAdditionalDetail { step, draft } => {
                self.on_detail_answer(session, step, draft, answer).await
            }
            Phase::ConfirmEnd => self.on_confirm_answer(session, answer),
            Phase::Greeting | Phase::Terminated | Phase::ExceptionTerminated { .. } => {
                Step::ask("", session)
            }
        };

        match step {
            Step::Continue { .. } if session.turn_index >= self.settings.max_turns => {
                tracing::warn!(
                    "[FlowController] {} reached the turn cap ({}), ending call",
                    session.call_key,
                    self.settings.max_turns
                );
                Step::completed()
            }
            other => other,
        }
    }

    /// Whether the answer reads as a yes or no to a yes/no question.
    fn is_reply_to(&self, phase: &Phase, answer: &str) -> bool {
        match phase {
            Phase::OfferHelp { .. } => self.vocabulary.intent(answer) != Intent::Unclear,
            Phase::ConfirmEnd => self.vocabulary.consent(answer) != Intent::Unclear,
            _ => false,
        }
    }

    fn on_silence(&self, session: &mut Session, phase: &Phase) -> Step {
        session.silent_reprompts += 1;
        if session.silent_reprompts > self.settings.max_silent_reprompts {
            tracing::info!(
                "[FlowController] {} silent {} times in a row, ending call",
                session.call_key,
                session.silent_reprompts
            );
            return Step::exception(FAIL_CODE_INCOMPREHENSIBLE);
        }
        tracing::debug!(
            "[FlowController] Blank answer for {}, re-prompting ({}/{})",
            session.call_key,
            session.silent_reprompts,
            self.settings.max_silent_reprompts
        );
        Step::Continue {
            text: prompt::join(prompt::NOT_HEARD, &prompt::question_for(session, phase)),
        }
    }

    async fn on_item_answer(
        &self,
        session: &mut Session,
        rules: &KeywordRules,
        index: usize,
        answer: &str,
    ) -> Step {
        let keyword = AnswerClassifier::classify_keywords(rules, answer);
        let resolved = self.vocabulary.is_resolved(answer)
            && !matches!(
                keyword,
                Some(ClassificationResult::Risk { .. } | ClassificationResult::Escalation { .. })
            );

        let result = match keyword {
            Some(result) => result,
            None if resolved => ClassificationResult::Unclassifiable,
            None => self.classifier.classify_scored(answer).await,
        };
        let escalated = self.apply(session, &result) > 0;

        let next_index = index + 1;
        if resolved {
            session.phase = self.item_or_additional(session, next_index);
            Step::ask(prompt::ACK_RESOLVED, session)
        } else if escalated {
            session.phase = self.item_or_additional(session, next_index);
            Step::ask(prompt::ACK_REFERRED, session)
        } else {
            session.phase = Phase::OfferHelp {
                next_item: (next_index < session.known_item_count()).then_some(next_index),
            };
            Step::ask(prompt::ACK_NOTED, session)
        }
    }

    fn on_help_answer(
        &self,
        session: &mut Session,
        rules: &KeywordRules,
        next_item: Option<usize>,
        answer: &str,
    ) -> Step {
        let wants_help = match self.vocabulary.intent(answer) {
            Intent::Yes => true,
            Intent::No => false,
            Intent::Unclear => rules.match_deep_referral(answer).is_some(),
        };

        let ack = if wants_help {
            session.escalate(NEED_HUMAN_REQUESTED);
            prompt::ACK_REFERRED
        } else {
            prompt::ACK_NOTED
        };

        session.phase = match next_item {
            Some(index) => self.item_or_additional(session, index),
            None => Phase::AskAdditional,
        };
        Step::ask(ack, session)
    }

    fn on_additional_answer(&self, session: &mut Session, rules: &KeywordRules, answer: &str) -> Step {
        if rules.match_deep_referral(answer).is_some() {
            session.escalate(NEED_HUMAN_REQUESTED);
            session.phase = Phase::AskAdditional;
            return Step::ask(prompt::ACK_REFERRED, session);
        }

        if self.vocabulary.is_nothing_more(answer) {
            session.phase = Phase::ConfirmEnd;
            return Step::ask("", session);
        }

        session.phase = Phase::AskAdditionalDetail {
            step: DetailStep::Why,
            draft: DetailDraft::starting_with(answer),
        };
        Step::ask(prompt::ACK_NOTED, session)
    }

    async fn on_detail_answer(
        &self,
        session: &mut Session,
        step: DetailStep,
        mut draft: DetailDraft,
        answer: &str,
    ) -> Step {
        draft.record(step, answer);

        if let Some(next) = step.next() {
            session.phase = Phase::AskAdditionalDetail { step: next, draft };
            return Step::ask("", session);
        }

        let result = self.classifier.classify_scored(&draft.aggregate()).await;
        self.apply(session, &result);

        match result.tier() {
            Some(SeverityTier::Critical) => {
                session.phase = Phase::AskAdditional;
                Step::ask(prompt::ACK_REFERRED, session)
            }
            Some(SeverityTier::Caution) => {
                session.phase = Phase::OfferHelp { next_item: None };
                Step::ask(prompt::ACK_NOTED, session)
            }
            _ => {
                session.phase = Phase::AskAdditional;
                Step::ask(prompt::ACK_NOTED, session)
            }
        }
    }

    fn on_confirm_answer(&self, session: &mut Session, answer: &str) -> Step {
        let confirmed = match self.vocabulary.consent(answer) {
            Intent::Yes => true,
            Intent::No => false,
            Intent::Unclear => self.vocabulary.is_nothing_more(answer),
        };

        if confirmed {
            Step::completed()
        } else {
            session.phase = Phase::AskAdditional;
            Step::ask(prompt::ACK_NOTED, session)
        }
    }

    /// Applies a classification to the session: raises `need_human` and
    /// merges the registry item, if any. Returns the escalation level.
    fn apply(&self, session: &mut Session, result: &ClassificationResult) -> u8 {
        let level = result.escalation_level();
        if level > 0 {
            tracing::info!(
                "[FlowController] {} escalated to need_human={}",
                session.call_key,
                level
            );
            session.escalate(level);
        }

        if let Some(item) = result.registry_item(self.settings.category_defaults) {
            let content = item.content.clone();
            if session.merge(item) {
                tracing::debug!("[FlowController] {} registered '{}'", session.call_key, content);
            }
        }
        level
    }

    fn item_or_additional(&self, session: &Session, index: usize) -> Phase {
        if index < session.known_item_count() {
            Phase::AskItem { index }
        } else {
            Phase::AskAdditional
        }
    }

    /// Terminal transition: report, clear, deliver.
    async fn finish(&self, mut session: Session, fail_code: u32) {
        session.phase = if fail_code > 0 {
            Phase::ExceptionTerminated { fail_code }
        } else {
            Phase::Terminated
        };

        let report = self
            .reports
            .build(&session, fail_code, session.need_human)
            .await;

        if let Err(e) = self.clear(&session.call_key).await {
            tracing::error!(
                "[FlowController] Failed to clear session {}: {}",
                session.call_key,
                e
            );
        }

        tracing::info!(
            "[FlowController] Call {} finished: result={}, fail_code={}, need_human={}, runtime={}s",
            session.call_key,
            report.result,
            report.fail_code,
            report.need_human,
            report.runtime_seconds
        );

        match tokio::time::timeout(
            self.settings.delivery_timeout,
            self.sink.deliver(&session.call_key, &report),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(
                "[FlowController] Outcome delivery failed for {}: {}",
                session.call_key,
                e
            ),
            Err(_) => tracing::error!(
                "[FlowController] Outcome delivery timed out for {}",
                session.call_key
            ),
        }
    }

    async fn load(&self, call_key: &str) -> Result<Session> {
        tokio::time::timeout(self.settings.store_timeout, self.store.get(call_key))
            .await
            .map_err(|_| CallbotError::timeout("session store get"))?
    }

    async fn persist(&self, session: &Session) -> Result<()> {
        tokio::time::timeout(
            self.settings.store_timeout,
            self.store.save(&session.call_key, session),
        )
        .await
        .map_err(|_| CallbotError::timeout("session store save"))?
    }

    async fn clear(&self, call_key: &str) -> Result<()> {
        tokio::time::timeout(self.settings.store_timeout, self.store.clear(call_key))
            .await
            .map_err(|_| CallbotError::timeout("session store clear"))?
    }
}
