//! Mock processor — in-process test double.
//!
//! Selected at construction time for local development (`processor.mode =
//! "mock"`) and used directly in tests. The default instance approves every
//! charge; tests can script failures and inspect call counts.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use vx_domain::error::{Error, Result};

use crate::traits::{CardDetails, CardProcessor, IntentRequest, IntentStatus};

pub struct MockProcessor {
    confirm_status: Mutex<IntentStatus>,
    fail_tokenize: Mutex<Option<String>>,
    intent_count: AtomicUsize,
    tokenize_count: AtomicUsize,
    confirm_count: AtomicUsize,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessor {
    /// A double that approves everything.
    pub fn new() -> Self {
        Self {
            confirm_status: Mutex::new(IntentStatus::Succeeded),
            fail_tokenize: Mutex::new(None),
            intent_count: AtomicUsize::new(0),
            tokenize_count: AtomicUsize::new(0),
            confirm_count: AtomicUsize::new(0),
        }
    }

    /// Script the status returned by `confirm_intent`.
    pub fn with_confirm_status(self, status: IntentStatus) -> Self {
        *self.confirm_status.lock() = status;
        self
    }

    /// Script `create_token` to fail with a tokenization error.
    pub fn with_tokenize_failure(self, message: impl Into<String>) -> Self {
        *self.fail_tokenize.lock() = Some(message.into());
        self
    }

    pub fn intent_count(&self) -> usize {
        self.intent_count.load(Ordering::SeqCst)
    }

    pub fn tokenize_count(&self) -> usize {
        self.tokenize_count.load(Ordering::SeqCst)
    }

    pub fn confirm_count(&self) -> usize {
        self.confirm_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CardProcessor for MockProcessor {
    async fn create_intent(&self, req: IntentRequest) -> Result<String> {
        let n = self.intent_count.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(amount = req.amount, "mock intent created");
        Ok(format!("pi_mock_{n}"))
    }

    async fn create_token(&self, _card: &CardDetails) -> Result<String> {
        self.tokenize_count.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_tokenize.lock().clone() {
            return Err(Error::Tokenization(message));
        }
        Ok("tok_mock_for_local_testing".into())
    }

    async fn confirm_intent(&self, _intent_id: &str, _token: &str) -> Result<IntentStatus> {
        self.confirm_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.confirm_status.lock().clone())
    }

    fn processor_id(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_card() -> CardDetails {
        CardDetails {
            number: "4242424242424242".into(),
            expiry_month: "12".into(),
            expiry_year: "25".into(),
            cvv: "123".into(),
        }
    }

    #[tokio::test]
    async fn default_mock_approves() {
        let mock = MockProcessor::new();
        let intent = mock
            .create_intent(IntentRequest {
                amount: 500,
                currency: "usd".into(),
                destination_account: None,
            })
            .await
            .unwrap();
        let token = mock.create_token(&test_card()).await.unwrap();
        let status = mock.confirm_intent(&intent, &token).await.unwrap();
        assert!(status.is_success());
        assert_eq!(mock.tokenize_count(), 1);
        assert_eq!(mock.confirm_count(), 1);
    }

    #[tokio::test]
    async fn scripted_tokenize_failure() {
        let mock = MockProcessor::new().with_tokenize_failure("card_declined");
        let err = mock.create_token(&test_card()).await.unwrap_err();
        assert!(matches!(err, Error::Tokenization(_)));
    }

    #[tokio::test]
    async fn scripted_decline() {
        let mock =
            MockProcessor::new().with_confirm_status(IntentStatus::Other("canceled".into()));
        let status = mock.confirm_intent("pi_x", "tok_x").await.unwrap();
        assert!(!status.is_success());
    }
}
