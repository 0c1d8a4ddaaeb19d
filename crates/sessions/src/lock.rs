//! Per-call concurrency control.
//!
//! The telephony provider may redeliver the same webhook event, so two
//! requests for one call can race. Each call identifier maps to a
//! `Semaphore(1)`; holding the permit serializes the whole read-modify-write
//! turn for that call. Requests for different calls proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Manages per-call turn locks.
pub struct CallLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for CallLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CallLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the turn lock for a call.
    ///
    /// Waits for any in-flight turn on the same call to finish. Hold the
    /// permit for the duration of the turn; it auto-releases on drop.
    pub async fn acquire(&self, call_sid: &str) -> Result<OwnedSemaphorePermit, CallBusy> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(call_sid.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        sem.acquire_owned().await.map_err(|_| CallBusy)
    }

    /// Number of tracked calls (for monitoring).
    pub fn call_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop lock entries for calls with no active holder.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| sem.available_permits() == 0);
    }
}

/// Error returned when a call's lock can no longer be acquired.
#[derive(Debug)]
pub struct CallBusy;

impl std::fmt::Display for CallBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call lock is no longer available")
    }
}

impl std::error::Error for CallBusy {}
