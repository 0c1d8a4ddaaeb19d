use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Card processor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which processor implementation to construct at startup.
///
/// The choice is made once, in bootstrap. Business logic only ever sees the
/// `CardProcessor` trait and never branches on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorMode {
    /// Live Stripe adapter. Requires a secret key.
    Live,
    /// In-process test double. Every charge succeeds.
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    #[serde(default = "d_mode")]
    pub mode: ProcessorMode,
    /// Stripe secret key, set directly in config. Takes priority over
    /// `secret_key_env`.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Environment variable holding the secret key when `secret_key` is unset.
    #[serde(default = "d_secret_key_env")]
    pub secret_key_env: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Request timeout for tokenize/confirm calls. The whole charge sequence
    /// runs inside a live voice call, so this stays tight.
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional connected-account destination. When set, payment intents are
    /// created `on_behalf_of` this account with funds transferred to it.
    #[serde(default)]
    pub destination_account: Option<String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            mode: ProcessorMode::Mock,
            secret_key: None,
            secret_key_env: d_secret_key_env(),
            base_url: d_base_url(),
            timeout_ms: 15_000,
            destination_account: None,
        }
    }
}

fn d_mode() -> ProcessorMode {
    ProcessorMode::Mock
}
fn d_secret_key_env() -> String {
    "STRIPE_SECRET_KEY".into()
}
fn d_base_url() -> String {
    "https://api.stripe.com".into()
}
fn d_timeout_ms() -> u64 {
    15_000
}
