//! Payment orchestrator.
//!
//! Runs the terminal step of the dialog: tokenize the captured card data,
//! confirm the pre-created payment intent, commit the transaction's
//! terminal status, and notify the agent. The status commit is guarded by a
//! scoped cleanup value ([`CompletionGuard`]) so it happens exactly once on
//! every exit path, including an unexpected fault that unwinds through
//! this function.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use vx_domain::error::{Error, Result};
use vx_domain::transaction::TransactionStatus;
use vx_processor::{CardDetails, CardProcessor};
use vx_sessions::CallSession;

use super::transactions::TransactionStore;
use super::webhook::{WebhookDispatcher, WebhookPayload};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcome
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of a charge attempt, as reported back to the digit processor.
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub success: bool,
    pub transaction_id: Uuid,
    /// Caller-safe failure description. `None` on success.
    pub message: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Completion guard
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Commits the transaction's terminal status on drop.
///
/// The happy and error paths call [`resolve`](Self::resolve) with the real
/// outcome; if the charge unwinds before resolution, the drop still marks
/// the transaction failed so no record is left pending forever.
struct CompletionGuard {
    transactions: Arc<dyn TransactionStore>,
    transaction_id: Uuid,
    outcome: Option<(TransactionStatus, Option<String>)>,
}

impl CompletionGuard {
    fn new(transactions: Arc<dyn TransactionStore>, transaction_id: Uuid) -> Self {
        Self {
            transactions,
            transaction_id,
            outcome: None,
        }
    }

    fn resolve(&mut self, status: TransactionStatus, error_message: Option<String>) {
        self.outcome = Some((status, error_message));
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let (status, error_message) = self.outcome.take().unwrap_or((
            TransactionStatus::Failed,
            Some("payment aborted before completion".into()),
        ));
        self.transactions
            .complete(&self.transaction_id, status, error_message);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Orchestrator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct PaymentOrchestrator {
    processor: Arc<dyn CardProcessor>,
    transactions: Arc<dyn TransactionStore>,
    webhooks: Arc<WebhookDispatcher>,
}

impl PaymentOrchestrator {
    pub fn new(
        processor: Arc<dyn CardProcessor>,
        transactions: Arc<dyn TransactionStore>,
        webhooks: Arc<WebhookDispatcher>,
    ) -> Self {
        Self {
            processor,
            transactions,
            webhooks,
        }
    }

    /// Charge a fully captured session and notify the agent.
    ///
    /// The transaction status is committed exactly once before the webhook
    /// fires; a delivery failure is logged and never alters the outcome.
    pub async fn charge_session(&self, session: &CallSession) -> ChargeOutcome {
        let mut guard =
            CompletionGuard::new(self.transactions.clone(), session.transaction_id);

        let result = self.tokenize_and_confirm(session).await;

        let (success, message) = match result {
            Ok(status) if status.is_success() => (true, None),
            Ok(_) => (false, Some("Payment intent confirmation failed".to_owned())),
            Err(e) => {
                tracing::warn!(
                    transaction_id = %session.transaction_id,
                    error = %e,
                    "charge attempt failed"
                );
                (false, Some(charge_failure_message(&e)))
            }
        };

        guard.resolve(
            if success {
                TransactionStatus::Succeeded
            } else {
                TransactionStatus::Failed
            },
            message.clone(),
        );
        // Commit now, before notification.
        drop(guard);

        let payload = WebhookPayload {
            transaction_id: session.transaction_id,
            status: if success {
                TransactionStatus::Succeeded
            } else {
                TransactionStatus::Failed
            },
            amount: session.amount,
            currency: session.currency.clone(),
            error_message: message.clone(),
        };
        if !self.webhooks.dispatch(&session.callback_url, &payload).await {
            tracing::warn!(
                transaction_id = %session.transaction_id,
                "outcome webhook was not delivered"
            );
        }

        ChargeOutcome {
            success,
            transaction_id: session.transaction_id,
            message,
        }
    }

    async fn tokenize_and_confirm(
        &self,
        session: &CallSession,
    ) -> Result<vx_processor::IntentStatus> {
        let card = build_card_details(session)?;
        let token = self.processor.create_token(&card).await?;
        self.processor.confirm_intent(&session.intent_id, &token).await
    }
}

/// Assemble and validate the tokenize input from a captured session.
///
/// Length checks mirror the collection steps: a card number under 13
/// digits or a security code under 3 cannot be tokenized.
fn build_card_details(session: &CallSession) -> Result<CardDetails> {
    let number = session
        .card_number
        .clone()
        .ok_or_else(|| Error::Validation("card number not captured".into()))?;
    let expiry = session
        .expiry
        .clone()
        .ok_or_else(|| Error::Validation("expiry not captured".into()))?;
    let cvv = session
        .cvv
        .clone()
        .ok_or_else(|| Error::Validation("security code not captured".into()))?;

    if number.expose_secret().len() < 13 {
        return Err(Error::Validation("invalid card number length".into()));
    }
    if cvv.expose_secret().len() < 3 {
        return Err(Error::Validation("invalid security code".into()));
    }

    let (expiry_month, expiry_year) = split_expiry(&expiry)?;

    Ok(CardDetails {
        number,
        expiry_month,
        expiry_year,
        cvv,
    })
}

/// Split the captured MMYY digits into month and two-digit year.
///
/// The collection step only admits ASCII digits, but this stays
/// boundary-safe regardless: malformed input becomes a validation error,
/// never a slice fault.
fn split_expiry(expiry: &SecretString) -> Result<(String, String)> {
    let digits = expiry.expose_secret();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation("invalid expiry format".into()));
    }
    let (month, year) = (digits.get(..2), digits.get(2..));
    match (month, year) {
        (Some(month), Some(year)) => Ok((month.to_owned(), year.to_owned())),
        _ => Err(Error::Validation("invalid expiry format".into())),
    }
}

/// Map an internal error to a message safe to store and forward.
fn charge_failure_message(e: &Error) -> String {
    match e {
        Error::Validation(m) => format!("Validation failed: {m}"),
        Error::Tokenization(_) => "Card tokenization failed".to_owned(),
        Error::Charge(_) => "Payment confirmation failed".to_owned(),
        _ => "Unknown charge error".to_owned(),
    }
}
