//! Directory-backed session store.
//!
//! Directory structure:
//! ```text
//! sessions/
//! ├── CA0123abcd.json
//! └── CA4567ef01.json
//! ```

use crate::dto::SessionDto;
use crate::paths::CallbotPaths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use callbot_core::Result;
use callbot_core::session::{Session, SessionStore};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Stores one JSON file per call key. Survives process restarts, so a call
/// in progress can be resumed by another instance sharing the directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store at the default location (`<data_dir>/callbot/sessions`).
    pub async fn default_location() -> Result<Self> {
        Self::new(CallbotPaths::sessions_dir()?).await
    }

    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        tracing::info!("[FileSessionStore] Using session directory {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, call_key: &str) -> AtomicJsonFile<SessionDto> {
        AtomicJsonFile::new(self.dir.join(format!("{}.json", encode_key(call_key))))
    }
}

/// Maps a call key onto a safe file stem. Alphanumerics, `-` and `_` pass
/// through; every other byte becomes `%XX`.
fn encode_key(call_key: &str) -> String {
    let mut encoded = String::with_capacity(call_key.len());
    for byte in call_key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, call_key: &str) -> Result<Session> {
        match self.file(call_key).load().await? {
            Some(dto) => Ok(dto.into_domain()),
            None => Ok(Session::empty(call_key)),
        }
    }

    async fn save(&self, call_key: &str, session: &Session) -> Result<()> {
        self.file(call_key)
            .save(&SessionDto::from_domain(session))
            .await
    }

    async fn clear(&self, call_key: &str) -> Result<()> {
        self.file(call_key).remove().await
    }
}
