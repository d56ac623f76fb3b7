//! Telephony webhook handling.

use crate::flow::FlowController;
use crate::prompt::Prompt;
use crate::twiml::TwimlRenderer;
use callbot_core::classification::categories::{FAIL_CODE_DISCONNECTED, FAIL_CODE_NO_PICKUP};
use callbot_core::collaborator::Transcriber;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Form fields of a voice webhook delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceWebhook {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: Option<String>,
    #[serde(rename = "RecordingUrl", default)]
    pub recording_url: Option<String>,
    #[serde(rename = "RecordingSid", default)]
    pub recording_sid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallStatusWebhook {
    #[serde(rename = "CallSid")]
    pub call_sid: String,
    #[serde(rename = "CallStatus")]
    pub call_status: String,
}

/// Fail code for a terminal call status, `None` for statuses that do not
/// end the call.
pub fn fail_code_for_status(status: &str) -> Option<u32> {
    match status {
        "completed" | "canceled" => Some(FAIL_CODE_DISCONNECTED),
        "busy" | "no-answer" | "failed" => Some(FAIL_CODE_NO_PICKUP),
        _ => None,
    }
}

pub struct VoiceService {
    flow: Arc<FlowController>,
    transcriber: Option<Arc<dyn Transcriber>>,
    transcription_timeout: Duration,
    renderer: TwimlRenderer,
}

impl VoiceService {
    pub fn new(
        flow: Arc<FlowController>,
        transcriber: Option<Arc<dyn Transcriber>>,
        transcription_timeout: Duration,
        renderer: TwimlRenderer,
    ) -> Self {
        Self {
            flow,
            transcriber,
            transcription_timeout,
            renderer,
        }
    }

    /// Runs one turn and returns the TwiML document to answer with.
    pub async fn on_voice(&self, webhook: VoiceWebhook) -> String {
        let prompt = self.turn(&webhook).await;
        self.renderer.render(&prompt)
    }

    async fn turn(&self, webhook: &VoiceWebhook) -> Prompt {
        if webhook.call_sid.trim().is_empty() {
            tracing::error!("[Voice] Delivery without CallSid");
            return Prompt::system_error();
        }

        let utterance = self.utterance(webhook).await;
        self.flow
            .handle_turn(
                &webhook.call_sid,
                utterance.as_deref(),
                webhook.recording_sid.as_deref(),
            )
            .await
    }

    /// Speech text of the delivery. A recording is transcribed; a failed
    /// transcription counts as no input.
    async fn utterance(&self, webhook: &VoiceWebhook) -> Option<String> {
        if let Some(speech) = webhook.speech_result.as_deref() {
            return Some(speech.to_string());
        }

        let url = webhook.recording_url.as_deref()?;
        let Some(transcriber) = &self.transcriber else {
            tracing::warn!(
                "[Voice] Recording for {} but no transcription gateway configured",
                webhook.call_sid
            );
            return None;
        };

        match tokio::time::timeout(self.transcription_timeout, transcriber.transcribe(url)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                tracing::warn!("[Voice] Transcription failed for {}: {}", webhook.call_sid, e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "[Voice] Transcription timed out for {} after {:?}",
                    webhook.call_sid,
                    self.transcription_timeout
                );
                None
            }
        }
    }

    /// Handles a call-status callback. Returns true when it ended a live call.
    pub async fn on_status(&self, webhook: CallStatusWebhook) -> bool {
        let Some(fail_code) = fail_code_for_status(&webhook.call_status) else {
            tracing::debug!(
                "[Voice] Status '{}' for {} ignored",
                webhook.call_status,
                webhook.call_sid
            );
            return false;
        };
        self.flow.disconnect(&webhook.call_sid, fail_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_code_for_status() {
        assert_eq!(fail_code_for_status("completed"), Some(5));
        assert_eq!(fail_code_for_status("canceled"), Some(5));
        assert_eq!(fail_code_for_status("no-answer"), Some(6));
        assert_eq!(fail_code_for_status("busy"), Some(6));
        assert_eq!(fail_code_for_status("in-progress"), None);
        assert_eq!(fail_code_for_status("ringing"), None);
    }

    #[test]
    fn test_webhook_field_names() {
        let webhook: VoiceWebhook = serde_json::from_value(serde_json::json!({
            "CallSid": "CA1",
            "RecordingUrl": "https://example.com/r.wav",
            "RecordingSid": "RE1",
        }))
        .unwrap();
        assert_eq!(webhook.call_sid, "CA1");
        assert_eq!(webhook.speech_result, None);
        assert_eq!(webhook.recording_sid.as_deref(), Some("RE1"));
    }
}
