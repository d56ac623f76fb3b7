#![allow(dead_code)]

use async_trait::async_trait;
use callbot_application::{
    AnswerClassifier, CallLocks, FlowController, FlowSettings, IntakeRequest, IntakeService,
    ReportBuilder,
};
use callbot_core::classification::KeywordRules;
use callbot_core::collaborator::{OutcomeSink, ScoredJudge, ScoredVerdict, Summarizer};
use callbot_core::config::Vocabulary;
use callbot_core::registry::SeverityScores;
use callbot_core::report::OutcomeReport;
use callbot_core::{CallbotError, Result};
use callbot_infrastructure::InMemorySessionStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub enum JudgeBehavior {
    Scores(u8, u8, u8),
    Fail,
}

pub struct MockJudge {
    behavior: JudgeBehavior,
    pub answers: Mutex<Vec<String>>,
}

impl MockJudge {
    pub fn new(behavior: JudgeBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            answers: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.answers.lock().unwrap().len()
    }
}

#[async_trait]
impl ScoredJudge for MockJudge {
    async fn judge(&self, answer: &str) -> Result<ScoredVerdict> {
        self.answers.lock().unwrap().push(answer.to_string());
        match self.behavior {
            JudgeBehavior::Scores(u, a, g) => Ok(ScoredVerdict {
                scores: SeverityScores::new(u, a, g),
                reason: "허리 통증".to_string(),
            }),
            JudgeBehavior::Fail => Err(CallbotError::collaborator("judge", "connection refused")),
        }
    }
}

pub struct FixedSummarizer;

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(&self, _script: &str) -> Result<String> {
        Ok("어르신과 안부 통화를 나눔.".to_string())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub deliveries: Mutex<Vec<(String, OutcomeReport)>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    pub fn last(&self) -> OutcomeReport {
        self.deliveries
            .lock()
            .unwrap()
            .last()
            .map(|(_, report)| report.clone())
            .expect("no report delivered")
    }
}

#[async_trait]
impl OutcomeSink for RecordingSink {
    async fn deliver(&self, call_key: &str, report: &OutcomeReport) -> Result<()> {
        self.deliveries
            .lock()
            .unwrap()
            .push((call_key.to_string(), report.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub flow: Arc<FlowController>,
    pub intake: IntakeService,
    pub store: Arc<InMemorySessionStore>,
    pub sink: Arc<RecordingSink>,
    pub judge: Arc<MockJudge>,
}

impl Harness {
    pub fn new(judge: JudgeBehavior) -> Self {
        Self::with_settings(judge, FlowSettings::default())
    }

    pub fn with_settings(judge: JudgeBehavior, settings: FlowSettings) -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let sink = Arc::new(RecordingSink::default());
        let judge = MockJudge::new(judge);
        let locks = CallLocks::new();

        let classifier = Arc::new(AnswerClassifier::new(
            KeywordRules::default(),
            judge.clone(),
            Duration::from_secs(1),
        ));
        let reports = ReportBuilder::new(Arc::new(FixedSummarizer), Duration::from_secs(1));
        let flow = Arc::new(FlowController::new(
            store.clone(),
            classifier,
            reports,
            sink.clone(),
            Vocabulary::default(),
            settings,
            locks.clone(),
        ));
        let intake = IntakeService::new(store.clone(), locks, Duration::from_secs(1));

        Self {
            flow,
            intake,
            store,
            sink,
            judge,
        }
    }

    /// Seeds `call_key` with the given known risk items.
    pub async fn seed(&self, call_key: &str, risks: &[(&str, u32)]) {
        let risk_list: Vec<_> = risks
            .iter()
            .map(|(content, index)| {
                serde_json::json!({ "content": content, "risk_index_list": [index] })
            })
            .collect();
        let request: IntakeRequest = serde_json::from_value(serde_json::json!({
            "call_key": call_key,
            "account_id": "acc-1",
            "s_index": 3,
            "v_id": "v-1",
            "q_id": "q-1",
            "name": "김복지",
            "phone": "010-1234-5678",
            "vulnerabilities": { "risk_list": risk_list, "desire_list": [] }
        }))
        .unwrap();
        self.intake.receive(request).await.unwrap();
    }
}
