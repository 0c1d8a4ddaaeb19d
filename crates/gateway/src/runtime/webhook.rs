//! Webhook dispatcher — delivers the payment outcome to the agent callback.
//!
//! The payload is serialized once; those exact bytes are both the POST body
//! and the signed message. With a configured secret the request carries
//! `X-Vortex-Signature: hex(HMAC-SHA256(secret, "{timestamp}.{body}"))`
//! alongside `X-Vortex-Timestamp`; without one, only the timestamp header
//! is sent. Delivery failures are reported as `false`, never as errors:
//! the payment outcome is already committed by the time we get here.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use uuid::Uuid;

use vx_domain::config::WebhookConfig;
use vx_domain::error::{Error, Result};
use vx_domain::transaction::TransactionStatus;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "X-Vortex-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Vortex-Signature";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Payload
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Outcome notification body. Derived from the transaction, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub transaction_id: Uuid,
    pub status: TransactionStatus,
    /// Minor units, unchanged from intent creation.
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dispatcher
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct WebhookDispatcher {
    client: reqwest::Client,
    secret: Option<SecretString>,
    max_attempts: u32,
}

impl WebhookDispatcher {
    /// Build the dispatcher from config.
    ///
    /// The signing secret comes from `webhook.secret` or, failing that, the
    /// env var named by `webhook.secret_env`; with neither set, payloads go
    /// out unsigned.
    pub fn from_config(cfg: &WebhookConfig) -> Result<Self> {
        let secret = cfg
            .secret
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var(&cfg.secret_env).ok().filter(|s| !s.is_empty()))
            .map(SecretString::from);

        if secret.is_none() {
            tracing::warn!(
                "webhook signing DISABLED — set webhook.secret in config or the {} env var",
                cfg.secret_env
            );
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            client,
            secret,
            max_attempts: cfg.max_attempts.max(1),
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(secret: Option<&str>, max_attempts: u32) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_millis(2_000))
                .build()
                .unwrap(),
            secret: secret.map(SecretString::from),
            max_attempts,
        }
    }

    /// Signature for a given timestamp and body, `None` when unsigned.
    fn signature_for(&self, timestamp: &str, body: &str) -> Option<String> {
        self.secret
            .as_ref()
            .map(|secret| signature(secret.expose_secret(), &signing_message(timestamp, body)))
    }

    /// Deliver one outcome notification.
    ///
    /// Returns `true` on a 2xx response. Transport faults and 5xx responses
    /// are retried with exponential backoff up to the configured attempt
    /// budget; 4xx is final. Never panics or returns an error.
    pub async fn dispatch(&self, url: &str, payload: &WebhookPayload) -> bool {
        if url.is_empty() {
            tracing::warn!("webhook URL missing, skipping dispatch");
            return false;
        }

        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "webhook payload serialization failed");
                return false;
            }
        };
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = self.signature_for(&timestamp, &body);

        for attempt in 1..=self.max_attempts {
            let mut request = self
                .client
                .post(url)
                .header("Content-Type", "application/json")
                .header(TIMESTAMP_HEADER, &timestamp);
            if let Some(ref sig) = signature {
                request = request.header(SIGNATURE_HEADER, sig);
            }

            match request.body(body.clone()).send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::info!(url, status = %resp.status(), attempt, "webhook delivered");
                    return true;
                }
                Ok(resp) if resp.status().is_server_error() && attempt < self.max_attempts => {
                    tracing::warn!(url, status = %resp.status(), attempt, "webhook 5xx, will retry");
                }
                Ok(resp) => {
                    tracing::warn!(
                        url,
                        status = %resp.status(),
                        attempt,
                        "webhook returned non-success status"
                    );
                    return false;
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(url, error = %e, attempt, "webhook failed, will retry");
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, attempt, "webhook delivery failed after retries");
                    return false;
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            let backoff_ms = (1u64 << (attempt - 1)) * 1000;
            tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
        }

        false
    }
}

/// The signed message is the timestamp and the serialized payload joined
/// with a dot.
pub fn signing_message(timestamp: &str, body: &str) -> String {
    format!("{timestamp}.{body}")
}

/// hex(HMAC-SHA256(secret, message))
pub fn signature(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
