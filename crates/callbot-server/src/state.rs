//! Composition root.

use anyhow::Result;
use async_trait::async_trait;
use callbot_application::{
    AnswerClassifier, CallLocks, FlowController, FlowSettings, IntakeService, ReportBuilder,
    TwimlRenderer, VoiceService,
};
use callbot_core::collaborator::Transcriber;
use callbot_core::config::{CallbotConfig, StorageKind};
use callbot_core::session::SessionStore;
use callbot_infrastructure::{FileSessionStore, InMemorySessionStore};
use callbot_interaction::chat_client::ChatModel;
use callbot_interaction::{
    HttpOutcomeSink, HttpTranscriber, InteractionError, LlmScoredJudge, LlmSummarizer,
    OpenAiChatClient,
};
use std::sync::Arc;

pub struct AppState {
    pub intake: IntakeService,
    pub voice: VoiceService,
}

/// Stand-in chat model when no API key is configured. Every call fails, so
/// the judge and summarizer take their fallbacks.
struct UnconfiguredModel;

#[async_trait]
impl ChatModel for UnconfiguredModel {
    async fn complete(&self, _system: &str, _user: &str) -> callbot_interaction::error::Result<String> {
        Err(InteractionError::NotConfigured("no chat model API key".into()))
    }
}

impl AppState {
    pub async fn build(config: &CallbotConfig) -> Result<Self> {
        let store = session_store(config).await?;
        let locks = CallLocks::new();
        let timeouts = &config.timeouts;

        let model: Arc<dyn ChatModel> = match OpenAiChatClient::from_config(&config.llm) {
            Ok(client) => {
                tracing::info!("[AppState] Chat model: {}", client.model());
                Arc::new(client)
            }
            Err(e) => {
                tracing::warn!(
                    "[AppState] {}; scored judgments fall back to conservative scores and summaries stay empty",
                    e
                );
                Arc::new(UnconfiguredModel)
            }
        };

        let classifier = Arc::new(AnswerClassifier::new(
            config.classifier.clone(),
            Arc::new(LlmScoredJudge::new(model.clone())),
            timeouts.judge(),
        ));
        let reports = ReportBuilder::new(Arc::new(LlmSummarizer::new(model)), timeouts.summary());
        let sink = Arc::new(HttpOutcomeSink::new(
            &config.outcome,
            timeouts.outcome_delivery(),
        ));
        tracing::info!("[AppState] Outcome sink: {}", config.outcome.url);

        let flow = Arc::new(FlowController::new(
            store.clone(),
            classifier,
            reports,
            sink,
            config.vocabulary.clone(),
            FlowSettings::from_config(config),
            locks.clone(),
        ));

        let transcriber: Option<Arc<dyn Transcriber>> = match &config.transcription.url {
            Some(url) => {
                tracing::info!("[AppState] Transcription gateway: {}", url);
                Some(Arc::new(HttpTranscriber::new(url, &config.server.language)))
            }
            None => {
                tracing::warn!("[AppState] No transcription gateway; recordings are treated as silence");
                None
            }
        };

        let renderer = TwimlRenderer::new(
            &config.server.language,
            config.server.record_max_length_secs,
            &config.server.voice_path,
        );

        Ok(Self {
            intake: IntakeService::new(store, locks, timeouts.session_store()),
            voice: VoiceService::new(flow, transcriber, timeouts.transcription(), renderer),
        })
    }
}

async fn session_store(config: &CallbotConfig) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match config.storage.kind {
        StorageKind::Memory => {
            tracing::info!("[AppState] Sessions kept in memory");
            Arc::new(InMemorySessionStore::new())
        }
        StorageKind::File => {
            let store = match &config.storage.dir {
                Some(dir) => FileSessionStore::new(dir).await?,
                None => FileSessionStore::default_location().await?,
            };
            tracing::info!("[AppState] Sessions stored in {}", store.dir().display());
            Arc::new(store)
        }
    };
    Ok(store)
}
