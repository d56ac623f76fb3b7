//! In-process session store.

use crate::dto::SessionDto;
use async_trait::async_trait;
use callbot_core::Result;
use callbot_core::session::{Session, SessionStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Session store backed by a map of serialized sessions.
///
/// Entries are kept as JSON so every read goes through the same
/// normalization as the file store, and callers never share a live
/// `Session` value with the store.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, call_key: &str) -> Result<Session> {
        let sessions = self.sessions.read().await;
        match sessions.get(call_key) {
            Some(json) => {
                let dto: SessionDto = serde_json::from_str(json)?;
                Ok(dto.into_domain())
            }
            None => Ok(Session::empty(call_key)),
        }
    }

    async fn save(&self, call_key: &str, session: &Session) -> Result<()> {
        let json = serde_json::to_string(&SessionDto::from_domain(session))?;
        let mut sessions = self.sessions.write().await;
        sessions.insert(call_key.to_string(), json);
        Ok(())
    }

    async fn clear(&self, call_key: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(call_key);
        Ok(())
    }
}
