use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outbound webhook delivery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret used to sign outcome notifications, set directly in
    /// config. Takes priority over `secret_env`. When neither is set the
    /// signature header is omitted entirely.
    #[serde(default)]
    pub secret: Option<String>,
    /// Environment variable holding the signing secret when `secret` is unset.
    #[serde(default = "d_secret_env")]
    pub secret_env: String,
    /// Per-request timeout for the POST to the agent callback.
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// Total delivery attempts (1 = no retry). Transport faults and 5xx
    /// responses are retried with exponential backoff; 4xx is final.
    #[serde(default = "d_3")]
    pub max_attempts: u32,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            secret_env: d_secret_env(),
            timeout_ms: 10_000,
            max_attempts: 3,
        }
    }
}

fn d_secret_env() -> String {
    "VORTEX_WEBHOOK_SECRET".into()
}
fn d_timeout_ms() -> u64 {
    10_000
}
fn d_3() -> u32 {
    3
}
