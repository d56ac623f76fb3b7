//! Per-call serialization.
//!
//! Turns for one call key run strictly one after another; different keys
//! never wait on each other. Entries are dropped from the table when the
//! last holder or waiter lets go.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

#[derive(Default, Clone)]
pub struct CallLocks {
    table: LockTable,
}

/// Exclusive access to one call key, released on drop.
pub struct CallGuard {
    key: String,
    lock: Arc<AsyncMutex<()>>,
    table: LockTable,
    _guard: OwnedMutexGuard<()>,
}

impl CallLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn for `call_key` is in flight.
    pub async fn lock(&self, call_key: &str) -> CallGuard {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            table
                .entry(call_key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let guard = lock.clone().lock_owned().await;
        CallGuard {
            key: call_key.to_string(),
            lock,
            table: self.table.clone(),
            _guard: guard,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn active(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        // table entry + this guard's handle + the owned guard's handle
        if Arc::strong_count(&self.lock) <= 3 {
            table.remove(&self.key);
        }
    }
}
