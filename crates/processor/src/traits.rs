use secrecy::SecretString;

use vx_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Raw card data captured over the keypad.
///
/// The number and security code are held as [`SecretString`] so they are
/// redacted from Debug output. Nothing in this crate logs or persists them;
/// they exist in memory only for the single tokenize call.
#[derive(Debug, Clone)]
pub struct CardDetails {
    pub number: SecretString,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: SecretString,
}

/// Parameters for creating a payment intent ahead of the IVR dialog.
#[derive(Debug, Clone)]
pub struct IntentRequest {
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    /// Optional connected-account destination for routed payments.
    pub destination_account: Option<String>,
}

/// Processor-side status of a payment intent after confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentStatus {
    Succeeded,
    RequiresCapture,
    /// Any other processor status (declined, requires_action, ...).
    Other(String),
}

impl IntentStatus {
    /// A confirmed charge counts as successful when the intent settled or
    /// is merely awaiting capture.
    pub fn is_success(&self) -> bool {
        matches!(self, IntentStatus::Succeeded | IntentStatus::RequiresCapture)
    }

    pub fn from_wire(status: &str) -> Self {
        match status {
            "succeeded" => IntentStatus::Succeeded,
            "requires_capture" => IntentStatus::RequiresCapture,
            other => IntentStatus::Other(other.to_owned()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core processor trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Seam between the payment flow and the external card processor.
///
/// Implementations translate between our types and the processor's wire
/// format. Errors are already mapped to the domain taxonomy
/// (`Tokenization`, `Charge`, `Http`).
#[async_trait::async_trait]
pub trait CardProcessor: Send + Sync {
    /// Create a payment intent for the given amount. Returns the
    /// processor-side intent reference.
    async fn create_intent(&self, req: IntentRequest) -> Result<String>;

    /// Exchange raw card data for a single-use token.
    async fn create_token(&self, card: &CardDetails) -> Result<String>;

    /// Build a payment method from the token and confirm the pre-created
    /// intent. Returns the resulting intent status.
    async fn confirm_intent(&self, intent_id: &str, token: &str) -> Result<IntentStatus>;

    /// A unique identifier for this processor instance.
    fn processor_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses() {
        assert!(IntentStatus::Succeeded.is_success());
        assert!(IntentStatus::RequiresCapture.is_success());
        assert!(!IntentStatus::Other("requires_action".into()).is_success());
    }

    #[test]
    fn wire_status_mapping() {
        assert_eq!(IntentStatus::from_wire("succeeded"), IntentStatus::Succeeded);
        assert_eq!(
            IntentStatus::from_wire("requires_capture"),
            IntentStatus::RequiresCapture
        );
        assert_eq!(
            IntentStatus::from_wire("canceled"),
            IntentStatus::Other("canceled".into())
        );
    }

    #[test]
    fn card_details_debug_is_redacted() {
        let card = CardDetails {
            number: "4242424242424242".into(),
            expiry_month: "12".into(),
            expiry_year: "25".into(),
            cvv: "123".into(),
        };
        let debug = format!("{card:?}");
        assert!(!debug.contains("4242424242424242"));
        assert!(!debug.contains("123"));
    }
}
