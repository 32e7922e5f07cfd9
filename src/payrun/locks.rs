//! Per-payrun exclusive locks.
//!
//! The persistence layer in production would provide a row lock or an
//! optimistic version column; in-process, an async mutex per payrun id
//! gives the same serialization guarantee for overlapping requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// A registry of per-payrun async locks.
///
/// Guards are released on drop, including when the holder's task is
/// abandoned, so a disconnected caller cannot wedge a payrun.
#[derive(Default)]
pub struct LockRegistry {
    locks: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive lock for one payrun, waiting if another
    /// operation currently holds it.
    pub async fn acquire(&self, payrun_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(payrun_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}
