//! Call summary backed by a chat model.

use crate::chat_client::ChatModel;
use async_trait::async_trait;
use callbot_core::Result;
use callbot_core::collaborator::Summarizer;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "다음은 복지 안부 전화의 질문과 답변 기록입니다. \
상담원이 바로 확인할 수 있도록 대상자의 현재 상황과 필요한 조치를 \
한국어 두세 문장으로 요약하세요. 기록에 없는 내용은 추측하지 마세요.";

pub struct LlmSummarizer {
    model: Arc<dyn ChatModel>,
}

impl LlmSummarizer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, script: &str) -> Result<String> {
        if script.trim().is_empty() {
            return Ok(String::new());
        }
        let summary = self
            .model
            .complete(SYSTEM_PROMPT, script)
            .await
            .map_err(|e| e.into_callbot("summarizer"))?;
        Ok(summary.trim().to_string())
    }
}
