//! Outcome report assembly.

use callbot_core::collaborator::Summarizer;
use callbot_core::registry;
use callbot_core::report::{InterviewResult, OutcomeReport, VulnerabilitySection, finalize_summary};
use callbot_core::session::{Session, render_script};
use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Builds the final report of a call.
///
/// Only the summary involves a collaborator; everything else is derived
/// from the session. A missing or failed summary becomes an empty string
/// before post-processing.
pub struct ReportBuilder {
    summarizer: Arc<dyn Summarizer>,
    summary_timeout: Duration,
}

impl ReportBuilder {
    pub fn new(summarizer: Arc<dyn Summarizer>, summary_timeout: Duration) -> Self {
        Self {
            summarizer,
            summary_timeout,
        }
    }

    pub async fn build(&self, session: &Session, fail_code: u32, need_human: u8) -> OutcomeReport {
        let script = render_script(&session.script);
        let summary = self.summarize(&session.call_key, &script).await;
        assemble(session, &summary, fail_code, need_human, Utc::now())
    }

    async fn summarize(&self, call_key: &str, script: &str) -> String {
        match tokio::time::timeout(self.summary_timeout, self.summarizer.summarize(script)).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => {
                tracing::warn!("[ReportBuilder] Summary failed for {}: {}", call_key, e);
                String::new()
            }
            Err(_) => {
                tracing::warn!(
                    "[ReportBuilder] Summary timed out for {} after {:?}",
                    call_key,
                    self.summary_timeout
                );
                String::new()
            }
        }
    }
}

/// Pure part of [`ReportBuilder::build`].
pub fn assemble(
    session: &Session,
    summary: &str,
    fail_code: u32,
    need_human: u8,
    now: DateTime<Utc>,
) -> OutcomeReport {
    let (removed_risk, added_risk) = registry::diff(&session.before_risk, &session.risk_list);
    let (removed_desire, added_desire) =
        registry::diff(&session.before_desire, &session.desire_list);

    let result = InterviewResult::determine(fail_code, need_human);

    OutcomeReport {
        reference: session.reference.clone(),
        overall_script: render_script(&session.script),
        summary: finalize_summary(summary, fail_code, need_human),
        result: result.code(),
        fail_code,
        need_human,
        runtime_seconds: session.runtime_seconds(now),
        time: now
            .with_timezone(&Local)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
        result_vulnerabilities: VulnerabilitySection::from_lists(
            &session.risk_list,
            &session.desire_list,
        ),
        delete_vulnerabilities: VulnerabilitySection::from_lists(&removed_risk, &removed_desire),
        new_vulnerabilities: VulnerabilitySection::from_lists(&added_risk, &added_desire),
    }
}
