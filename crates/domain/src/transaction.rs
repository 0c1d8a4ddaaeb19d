//! Persisted transaction model.
//!
//! A transaction is created `Pending` when a payment intent is set up and
//! transitions to `Succeeded` or `Failed` exactly once when the payment
//! orchestrator completes the charge attempt. The storage layer lives in the
//! gateway crate; this module only defines the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal-or-pending status of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Succeeded,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// One payment attempt driven through the IVR dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Routing destination pass-through (e.g. a connected account id).
    /// `None` for payments settled on the platform account.
    #[serde(default)]
    pub routing_ref: Option<String>,
    /// Amount in minor units (cents).
    pub amount: i64,
    pub currency: String,
    pub status: TransactionStatus,
    /// Processor-side payment intent reference.
    pub intent_id: String,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new pending transaction for a freshly created payment intent.
    pub fn pending(
        amount: i64,
        currency: impl Into<String>,
        intent_id: impl Into<String>,
        routing_ref: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            routing_ref,
            amount,
            currency: currency.into(),
            status: TransactionStatus::Pending,
            intent_id: intent_id.into(),
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_transaction_starts_incomplete() {
        let tx = Transaction::pending(500, "usd", "pi_123", None);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(!tx.status.is_terminal());
        assert!(tx.completed_at.is_none());
        assert!(tx.error_message.is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Succeeded).unwrap(),
            "\"succeeded\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Failed).unwrap(),
            "\"failed\""
        );
    }
}
