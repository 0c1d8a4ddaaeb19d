//! Session store for in-flight IVR payment dialogs.
//!
//! Pure key-value semantics with partial-update merge. Sessions are never
//! persisted: the captured card fields must not outlive the call, and the
//! store holds them as [`SecretString`] so they stay out of Debug output
//! and logs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use secrecy::SecretString;
use uuid::Uuid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session model
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the digit-collection dialog currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherStep {
    CollectCard,
    CollectExpiry,
    CollectCvv,
    /// Terminal collection step: all fields captured, charge in progress.
    Confirm,
}

/// One in-flight payment dialog, keyed by the provider call identifier.
#[derive(Debug, Clone)]
pub struct CallSession {
    pub call_sid: String,
    pub step: GatherStep,
    /// Invalid submissions at the current step. Three is fatal.
    pub strikes: u8,
    pub card_number: Option<SecretString>,
    pub expiry: Option<SecretString>,
    pub cvv: Option<SecretString>,
    /// Amount in minor units, fixed at intent creation.
    pub amount: i64,
    pub currency: String,
    /// Processor-side payment intent reference.
    pub intent_id: String,
    pub transaction_id: Uuid,
    /// Agent webhook/redirect target for the payment outcome.
    pub callback_url: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the intent-creation endpoint when opening a dialog.
#[derive(Debug, Clone)]
pub struct SessionCreate {
    pub amount: i64,
    pub currency: String,
    pub intent_id: String,
    pub transaction_id: Uuid,
    pub callback_url: String,
}

/// Partial update merged onto an existing session.
#[derive(Debug, Default)]
pub struct SessionUpdate {
    pub step: Option<GatherStep>,
    pub strikes: Option<u8>,
    pub card_number: Option<SecretString>,
    pub expiry: Option<SecretString>,
    pub cvv: Option<SecretString>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// In-memory session store.
///
/// Reads and writes for distinct call identifiers proceed independently;
/// individual operations on the same key are serialized by the lock. Whole
/// read-modify-write turns are additionally serialized per call by
/// [`crate::CallLockMap`].
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, CallSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new dialog at the first collection step.
    ///
    /// Replaces any stale session for the same call identifier.
    pub fn create(&self, call_sid: &str, fields: SessionCreate) -> CallSession {
        let session = CallSession {
            call_sid: call_sid.to_owned(),
            step: GatherStep::CollectCard,
            strikes: 0,
            card_number: None,
            expiry: None,
            cvv: None,
            amount: fields.amount,
            currency: fields.currency,
            intent_id: fields.intent_id,
            transaction_id: fields.transaction_id,
            callback_url: fields.callback_url,
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .insert(call_sid.to_owned(), session.clone());
        tracing::debug!(call_sid, "session created");
        session
    }

    pub fn get(&self, call_sid: &str) -> Option<CallSession> {
        self.sessions.read().get(call_sid).cloned()
    }

    /// Merge a partial update onto an existing session.
    ///
    /// Returns the updated session, or `None` when no session exists for
    /// the call identifier.
    pub fn update(&self, call_sid: &str, updates: SessionUpdate) -> Option<CallSession> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(call_sid)?;

        if let Some(step) = updates.step {
            session.step = step;
        }
        if let Some(strikes) = updates.strikes {
            session.strikes = strikes;
        }
        if let Some(card_number) = updates.card_number {
            session.card_number = Some(card_number);
        }
        if let Some(expiry) = updates.expiry {
            session.expiry = Some(expiry);
        }
        if let Some(cvv) = updates.cvv {
            session.cvv = Some(cvv);
        }

        Some(session.clone())
    }

    /// Remove a session. No-op when the key is absent.
    pub fn delete(&self, call_sid: &str) {
        if self.sessions.write().remove(call_sid).is_some() {
            tracing::debug!(call_sid, "session deleted");
        }
    }

    /// Number of in-flight dialogs (for monitoring).
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
