//! Scored judgment backed by a chat model.
//!
//! The model is asked for a single JSON object. Decoding is strict: the
//! object must parse, carry all four fields, and every score must lie in its
//! range. Anything else is a [`InteractionError::Decode`], which the
//! classifier turns into its conservative fallback.

use crate::chat_client::ChatModel;
use crate::error::InteractionError;
use async_trait::async_trait;
use callbot_core::Result;
use callbot_core::collaborator::{ScoredJudge, ScoredVerdict};
use callbot_core::registry::SeverityScores;
use serde::Deserialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "당신은 취약계층 안부 상담 내용을 평가하는 사회복지 전문가입니다. \
사용자의 답변을 읽고 다음 세 지표를 정수로 평가하세요.\n\
- urgency_score (0~3): 0 없음, 1 관찰 필요, 2 빠른 조치 필요, 3 즉시 개입 필요\n\
- adl_score (0~4): 일상생활 수행의 어려움. 0 지장 없음 ~ 4 거동 불가\n\
- guardian_score (0~4): 보호자 부재 정도. 0 보호자 상시 동행 ~ 4 보호자 전혀 없음\n\
- reason: 상황을 한 문장으로 요약한 한국어 문자열\n\
다른 설명 없이 JSON 객체 하나만 출력하세요. \
예: {\"urgency_score\": 1, \"adl_score\": 3, \"guardian_score\": 0, \"reason\": \"허리 통증 호소\"}";

/// [`ScoredJudge`] that delegates to a [`ChatModel`].
pub struct LlmScoredJudge {
    model: Arc<dyn ChatModel>,
}

impl LlmScoredJudge {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ScoredJudge for LlmScoredJudge {
    async fn judge(&self, answer: &str) -> Result<ScoredVerdict> {
        let raw = self
            .model
            .complete(SYSTEM_PROMPT, answer)
            .await
            .map_err(|e| e.into_callbot("scored_judge"))?;

        decode_verdict(&raw).map_err(|e| {
            tracing::warn!("[ScoredJudge] Rejecting model output: {}", raw);
            e.into_callbot("scored_judge")
        })
    }
}

#[derive(Deserialize)]
struct RawVerdict {
    urgency_score: i64,
    adl_score: i64,
    guardian_score: i64,
    reason: String,
}

/// Decodes the model's reply into a verdict.
///
/// Tolerates prose or code fences around the object; the outermost
/// `{ ... }` span is decoded.
pub fn decode_verdict(raw: &str) -> std::result::Result<ScoredVerdict, InteractionError> {
    let start = raw
        .find('{')
        .ok_or_else(|| InteractionError::Decode("no JSON object in reply".into()))?;
    let end = raw
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| InteractionError::Decode("unterminated JSON object".into()))?;

    let verdict: RawVerdict = serde_json::from_str(&raw[start..=end])
        .map_err(|e| InteractionError::Decode(format!("invalid verdict: {e}")))?;

    let score = |value: i64, max: u8, name: &str| -> std::result::Result<u8, InteractionError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= max)
            .ok_or_else(|| InteractionError::Decode(format!("{name} out of range: {value}")))
    };

    let scores = SeverityScores::new(
        score(verdict.urgency_score, SeverityScores::MAX_URGENCY, "urgency_score")?,
        score(verdict.adl_score, SeverityScores::MAX_ADL, "adl_score")?,
        score(verdict.guardian_score, SeverityScores::MAX_GUARDIAN, "guardian_score")?,
    );

    Ok(ScoredVerdict {
        scores,
        reason: verdict.reason.trim().to_string(),
    })
}
