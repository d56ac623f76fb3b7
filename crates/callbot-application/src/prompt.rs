//! What the caller hears next, and the spoken texts of the interview.

use callbot_core::session::{DetailStep, Phase, Session};

/// What the telephony side should do after speaking the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    RecordNext,
    HangUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub directive: Directive,
}

impl Prompt {
    pub fn ask(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            directive: Directive::RecordNext,
        }
    }

    pub fn hang_up(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            directive: Directive::HangUp,
        }
    }

    /// Spoken when a turn cannot be served at all.
    pub fn system_error() -> Self {
        Self::hang_up(SYSTEM_ERROR)
    }

    pub fn is_hang_up(&self) -> bool {
        self.directive == Directive::HangUp
    }
}

pub const GREETING: &str = "안녕하세요. 복지센터에서 안부 확인차 연락드렸습니다.";
pub const ASK_ADDITIONAL: &str = "혹시 요즘 새로 불편하시거나 도움이 필요한 점이 있으신가요?";
pub const CONFIRM_END: &str = "더 말씀하실 내용이 없으시면 통화를 마쳐도 될까요?";
pub const CLOSING: &str = "말씀해 주셔서 감사합니다. 건강히 지내세요. 통화를 종료하겠습니다.";
pub const EXCEPTION_CLOSING: &str = "연락에 응해 주셔서 감사합니다. 통화를 종료하겠습니다.";
pub const SYSTEM_ERROR: &str =
    "죄송합니다. 시스템 문제로 통화를 이어갈 수 없습니다. 다시 연락드리겠습니다.";
pub const NOT_HEARD: &str = "죄송합니다. 잘 듣지 못했습니다.";

pub const ACK_RESOLVED: &str = "다행입니다.";
pub const ACK_NOTED: &str = "네, 알겠습니다.";
pub const ACK_REFERRED: &str = "담당 상담원이 다시 연락드리도록 하겠습니다.";

pub fn ask_item(content: &str) -> String {
    format!("지난번에 말씀하신 {content} 관련해서, 지금은 좀 어떠신가요?")
}

pub fn offer_help() -> &'static str {
    "이 문제로 상담원과 직접 통화를 원하시나요?"
}

pub fn detail_question(step: DetailStep) -> &'static str {
    match step {
        DetailStep::What => "어떤 점이 불편하신지 조금 더 자세히 말씀해 주시겠어요?",
        DetailStep::Why => "그런 일이 생긴 이유나 계기가 있으신가요?",
        DetailStep::Urgency => "지금 당장 도움이 필요할 만큼 급한 상황이신가요?",
        DetailStep::Adl => "식사나 거동 같은 일상생활에 어려움이 있으신가요?",
        DetailStep::Guardian => "가까이에서 도와주실 가족이나 보호자가 계신가요?",
    }
}

/// The question a session in `phase` is waiting on. Recorded as the `Q`
/// of the script line for the answer that follows.
pub fn question_for(session: &Session, phase: &Phase) -> String {
    match phase {
        Phase::Greeting => GREETING.to_string(),
        Phase::AskItem { index } => session
            .known_item(*index)
            .map(|item| ask_item(&item.content))
            .unwrap_or_else(|| ASK_ADDITIONAL.to_string()),
        Phase::OfferHelp { .. } => offer_help().to_string(),
        Phase::AskAdditional => ASK_ADDITIONAL.to_string(),
        Phase::AskAdditionalDetail { step, .. } => detail_question(*step).to_string(),
        Phase::ConfirmEnd => CONFIRM_END.to_string(),
        Phase::Terminated => CLOSING.to_string(),
        Phase::ExceptionTerminated { .. } => EXCEPTION_CLOSING.to_string(),
    }
}

/// Joins an acknowledgement and the next question into one utterance.
pub fn join(ack: &str, question: &str) -> String {
    if ack.is_empty() {
        question.to_string()
    } else {
        format!("{ack} {question}")
    }
}
