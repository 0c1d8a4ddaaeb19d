use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_3100")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    /// Externally reachable base URL of this gateway. The telephony
    /// `<Gather action>` and `<Redirect>` targets are built on this base.
    #[serde(default = "d_public_url")]
    pub public_url: String,
    /// API key for the intent-creation endpoint, set directly in config.
    /// Takes priority over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key when `api_key` is unset.
    /// If neither is set, the server logs a warning and allows
    /// unauthenticated intent creation (dev mode).
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Maximum in-flight HTTP requests (backpressure protection).
    #[serde(default = "d_256")]
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3100,
            host: "127.0.0.1".into(),
            public_url: d_public_url(),
            api_key: None,
            api_key_env: d_api_key_env(),
            max_concurrent_requests: 256,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_3100() -> u16 {
    3100
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_public_url() -> String {
    "https://vortex.test".into()
}
fn d_api_key_env() -> String {
    "VORTEX_API_KEY".into()
}
fn d_256() -> usize {
    256
}
