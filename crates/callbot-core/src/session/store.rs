//! Session store trait.
//!
//! Defines the key/value contract the flow controller depends on.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// Keyed persistence for in-flight call sessions.
///
/// Implementations only serialize and deserialize; they never interpret the
/// session. Serializing access per key is the caller's job.
///
/// # Contract
///
/// - `get` of an unknown key returns [`Session::empty`], never an error
/// - `save` overwrites whatever is stored under the key
/// - `clear` of an unknown key succeeds
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the session stored under `call_key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Session)`: The stored session, or an unseeded empty one
    /// - `Err(_)`: The backing store could not be reached or decoded
    async fn get(&self, call_key: &str) -> Result<Session>;

    /// Stores `session` under `call_key`.
    async fn save(&self, call_key: &str, session: &Session) -> Result<()>;

    /// Removes the session stored under `call_key`.
    async fn clear(&self, call_key: &str) -> Result<()>;
}
