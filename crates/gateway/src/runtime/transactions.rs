//! Transaction store.
//!
//! The gateway drives the transaction lifecycle (pending → succeeded |
//! failed) but the durable store itself is an external concern, so the
//! access path is a trait. The shipped implementation appends records to a
//! JSONL log and keeps the current view in memory; on reload the last
//! record per id wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use vx_domain::transaction::{Transaction, TransactionStatus};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Persistence seam for payment transactions.
///
/// `complete` is the exactly-once commit point: it transitions a pending
/// transaction to a terminal status with a completion timestamp. Repeat
/// calls and calls for unknown ids return `false` and change nothing.
pub trait TransactionStore: Send + Sync {
    fn insert(&self, tx: Transaction);

    fn get(&self, id: &Uuid) -> Option<Transaction>;

    fn complete(
        &self,
        id: &Uuid,
        status: TransactionStatus,
        error_message: Option<String>,
    ) -> bool;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// File-backed store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// JSONL-backed transaction store.
pub struct FileTransactionStore {
    persist_path: PathBuf,
    inner: RwLock<HashMap<Uuid, Transaction>>,
}

impl FileTransactionStore {
    pub fn new(state_path: &Path) -> Self {
        let persist_path = state_path.join("transactions.jsonl");

        let mut transactions = HashMap::new();
        if let Ok(data) = std::fs::read_to_string(&persist_path) {
            for line in data.lines() {
                if let Ok(tx) = serde_json::from_str::<Transaction>(line) {
                    // Later records supersede earlier ones for the same id.
                    transactions.insert(tx.id, tx);
                }
            }
        }
        if !transactions.is_empty() {
            tracing::info!(count = transactions.len(), "loaded transactions from disk");
        }

        Self {
            persist_path,
            inner: RwLock::new(transactions),
        }
    }

    fn persist_one(path: &Path, tx: &Transaction) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string(tx) {
            use std::io::Write;
            if let Ok(mut f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                let _ = writeln!(f, "{}", json);
            }
        }
    }
}

impl TransactionStore for FileTransactionStore {
    fn insert(&self, tx: Transaction) {
        Self::persist_one(&self.persist_path, &tx);
        self.inner.write().insert(tx.id, tx);
    }

    fn get(&self, id: &Uuid) -> Option<Transaction> {
        self.inner.read().get(id).cloned()
    }

    fn complete(
        &self,
        id: &Uuid,
        status: TransactionStatus,
        error_message: Option<String>,
    ) -> bool {
        let mut inner = self.inner.write();
        let Some(tx) = inner.get_mut(id) else {
            tracing::warn!(transaction_id = %id, "complete() for unknown transaction");
            return false;
        };
        if tx.status.is_terminal() {
            tracing::warn!(
                transaction_id = %id,
                status = ?tx.status,
                "complete() for already-terminal transaction ignored"
            );
            return false;
        }

        tx.status = status;
        tx.error_message = error_message;
        tx.completed_at = Some(Utc::now());
        let snapshot = tx.clone();
        drop(inner);

        Self::persist_one(&self.persist_path, &snapshot);
        tracing::info!(
            transaction_id = %id,
            status = ?status,
            "transaction completed"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_complete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTransactionStore::new(dir.path());

        let tx = Transaction::pending(500, "usd", "pi_1", None);
        let id = tx.id;
        store.insert(tx);

        assert!(store.complete(&id, TransactionStatus::Succeeded, None));

        let tx = store.get(&id).unwrap();
        assert_eq!(tx.status, TransactionStatus::Succeeded);
        assert!(tx.completed_at.is_some());
    }

    #[test]
    fn complete_is_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTransactionStore::new(dir.path());

        let tx = Transaction::pending(500, "usd", "pi_1", None);
        let id = tx.id;
        store.insert(tx);

        assert!(store.complete(&id, TransactionStatus::Failed, Some("declined".into())));
        // Second commit must not overwrite the terminal state.
        assert!(!store.complete(&id, TransactionStatus::Succeeded, None));

        let tx = store.get(&id).unwrap();
        assert_eq!(tx.status, TransactionStatus::Failed);
        assert_eq!(tx.error_message.as_deref(), Some("declined"));
    }

    #[test]
    fn complete_unknown_id_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTransactionStore::new(dir.path());
        assert!(!store.complete(&Uuid::new_v4(), TransactionStatus::Succeeded, None));
    }

    #[test]
    fn reload_replays_last_record() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store = FileTransactionStore::new(dir.path());
            let tx = Transaction::pending(250, "eur", "pi_2", None);
            let id = tx.id;
            store.insert(tx);
            store.complete(&id, TransactionStatus::Succeeded, None);
            id
        };

        let store2 = FileTransactionStore::new(dir.path());
        let tx = store2.get(&id).unwrap();
        assert_eq!(tx.status, TransactionStatus::Succeeded);
        assert_eq!(tx.amount, 250);
    }
}
