//! Speech-to-text gateway client.

use crate::error::{InteractionError, Result};
use crate::http::read_success_body;
use async_trait::async_trait;
use callbot_core::collaborator::Transcriber;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct TranscriptionRequest<'a> {
    audio_url: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Sends a recording URL to the gateway and reads back `{"text": ...}`.
pub struct HttpTranscriber {
    client: Client,
    url: String,
    language: String,
}

impl HttpTranscriber {
    /// `language` is the BCP-47 tag of the call; the gateway receives its
    /// primary subtag (`ko-KR` becomes `ko`).
    pub fn new(url: impl Into<String>, language: &str) -> Self {
        let language = language.split('-').next().unwrap_or(language).to_string();
        Self {
            client: Client::new(),
            url: url.into(),
            language,
        }
    }

    async fn request(&self, recording_url: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&TranscriptionRequest {
                audio_url: recording_url,
                language: &self.language,
            })
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| InteractionError::Decode(format!("transcription response: {e}")))?;
        Ok(parsed.text.trim().to_string())
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, recording_url: &str) -> callbot_core::Result<String> {
        self.request(recording_url)
            .await
            .map_err(|e| e.into_callbot("transcriber"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::post};
    use serde_json::{Value, json};

    #[test]
    fn test_language_primary_subtag() {
        assert_eq!(HttpTranscriber::new("http://stt", "ko-KR").language, "ko");
        assert_eq!(HttpTranscriber::new("http://stt", "en").language, "en");
    }

    #[tokio::test]
    async fn test_transcribe_round_trip() {
        let app = Router::new().route(
            "/stt",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["language"], "ko");
                Json(json!({"text": format!(" {} 해결됐어요 ", body["audio_url"].as_str().unwrap_or(""))}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let transcriber = HttpTranscriber::new(format!("http://{addr}/stt"), "ko-KR");
        let text = transcriber.transcribe("rec-1").await.unwrap();
        assert_eq!(text, "rec-1 해결됐어요");
    }
}
