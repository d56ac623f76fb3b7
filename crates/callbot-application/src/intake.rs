//! Case-file intake.
//!
//! Seeds the session a scheduled call will run against. The before-snapshots
//! of the registry are taken here and never again.

use crate::locks::CallLocks;
use callbot_core::case_file::CaseFile;
use callbot_core::session::{Session, SessionStore};
use callbot_core::{CallbotError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Body of an intake request: the case file, optionally with the key the
/// telephony side will use for the call.
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub call_key: Option<String>,
    #[serde(flatten)]
    pub case_file: CaseFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeReceipt {
    pub call_key: String,
    pub question_count: usize,
    /// Normalized E.164 number to dial.
    pub phone: String,
}

pub struct IntakeService {
    store: Arc<dyn SessionStore>,
    locks: CallLocks,
    store_timeout: Duration,
}

impl IntakeService {
    /// `locks` must be the table shared with the flow controller.
    pub fn new(store: Arc<dyn SessionStore>, locks: CallLocks, store_timeout: Duration) -> Self {
        Self {
            store,
            locks,
            store_timeout,
        }
    }

    pub async fn receive(&self, request: IntakeRequest) -> Result<IntakeReceipt> {
        let call_key = request
            .call_key
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let _guard = self.locks.lock(&call_key).await;

        let existing = tokio::time::timeout(self.store_timeout, self.store.get(&call_key))
            .await
            .map_err(|_| CallbotError::timeout("session store get"))??;
        if existing.is_live() {
            return Err(CallbotError::invalid_state(format!(
                "call {} already has a live session",
                call_key
            )));
        }

        let session = Session::seed(call_key.as_str(), &request.case_file);
        tokio::time::timeout(self.store_timeout, self.store.save(&call_key, &session))
            .await
            .map_err(|_| CallbotError::timeout("session store save"))??;

        tracing::info!(
            "[Intake] Seeded {} with {} risk / {} desire items, {} questions",
            call_key,
            session.risk_list.len(),
            session.desire_list.len(),
            session.question_list.len()
        );

        Ok(IntakeReceipt {
            call_key,
            question_count: session.question_list.len(),
            phone: session.phone,
        })
    }
}
