//! HTTP delivery of outcome reports to the case-management backend.

use crate::error::{InteractionError, Result};
use crate::http::read_success_body;
use async_trait::async_trait;
use callbot_core::collaborator::OutcomeSink;
use callbot_core::config::OutcomeConfig;
use callbot_core::report::OutcomeReport;
use reqwest::Client;
use std::time::Duration;

/// Posts the report as JSON, retrying transient failures.
///
/// Every attempt carries `Idempotency-Key: <call_key>` so the backend can
/// drop repeats of a report it already stored.
pub struct HttpOutcomeSink {
    client: Client,
    url: String,
    max_attempts: u32,
    backoff: Duration,
    attempt_timeout: Duration,
}

impl HttpOutcomeSink {
    pub fn new(config: &OutcomeConfig, attempt_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: config.url.clone(),
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            attempt_timeout,
        }
    }

    async fn post_once(&self, call_key: &str, report: &OutcomeReport) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header("Idempotency-Key", call_key)
            .timeout(self.attempt_timeout)
            .json(report)
            .send()
            .await?;
        read_success_body(response).await.map(|_| ())
    }

    /// Linear backoff, or the server's `Retry-After` when it gave one.
    fn delay_for(&self, attempt: u32, err: &InteractionError) -> Duration {
        err.retry_after().unwrap_or(self.backoff * attempt)
    }
}

#[async_trait]
impl OutcomeSink for HttpOutcomeSink {
    async fn deliver(&self, call_key: &str, report: &OutcomeReport) -> callbot_core::Result<()> {
        let mut attempt = 1;
        loop {
            match self.post_once(call_key, report).await {
                Ok(()) => {
                    tracing::info!(
                        "[OutcomeSink] Delivered report for {} (attempt {})",
                        call_key,
                        attempt
                    );
                    return Ok(());
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt, &err);
                    tracing::warn!(
                        "[OutcomeSink] Attempt {}/{} for {} failed: {}. Retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        call_key,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into_callbot("outcome_sink")),
            }
        }
    }
}
