//! Live Stripe adapter.
//!
//! Talks to the Stripe REST API with form-encoded requests. Raw card data
//! is placed in the tokenize request body and nowhere else; it is never
//! logged, serialized into errors, or persisted.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use vx_domain::config::ProcessorConfig;
use vx_domain::error::{Error, Result};

use crate::traits::{CardDetails, CardProcessor, IntentRequest, IntentStatus};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// SecretString keeps the key out of Debug output.
#[derive(Debug)]
pub struct StripeProcessor {
    base_url: String,
    secret_key: SecretString,
    client: reqwest::Client,
}

impl StripeProcessor {
    /// Build the live adapter from config.
    ///
    /// The secret key comes from `processor.secret_key` or, failing that,
    /// the env var named by `processor.secret_key_env`. A missing key is a
    /// hard config error; there is no silent fallback to the mock.
    pub fn from_config(cfg: &ProcessorConfig) -> Result<Self> {
        let secret_key = cfg
            .secret_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&cfg.secret_key_env).ok().filter(|k| !k.is_empty()))
            .map(SecretString::from)
            .ok_or_else(|| {
                Error::Config(format!(
                    "live processor requires processor.secret_key or the {} env var",
                    cfg.secret_key_env
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            secret_key,
            client,
        })
    }

    // ── Internal: authenticated form POST ──────────────────────────

    async fn post_form(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.secret_key.expose_secret())
            .form(params)
            .send()
            .await
            .map_err(|e| Error::Http(format!("POST {path}: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("POST {path}: reading body: {e}")))?;

        if !status.is_success() {
            // Stripe error envelope: { "error": { "message": "..." } }.
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown processor error");
            return Err(Error::Http(format!("POST {path}: {status}: {message}")));
        }

        Ok(body)
    }

    fn extract_str(body: &Value, field: &str, path: &str) -> Result<String> {
        body.get(field)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::Http(format!("POST {path}: response missing `{field}`")))
    }
}

#[async_trait::async_trait]
impl CardProcessor for StripeProcessor {
    async fn create_intent(&self, req: IntentRequest) -> Result<String> {
        let mut params = vec![
            ("amount".to_owned(), req.amount.to_string()),
            ("currency".to_owned(), req.currency.to_lowercase()),
            ("capture_method".to_owned(), "automatic".to_owned()),
        ];
        if let Some(destination) = req.destination_account {
            params.push(("on_behalf_of".to_owned(), destination.clone()));
            params.push(("transfer_data[destination]".to_owned(), destination));
        }

        let body = self.post_form("/v1/payment_intents", &params).await?;
        let intent_id = Self::extract_str(&body, "id", "/v1/payment_intents")?;
        tracing::info!(intent_id = %intent_id, amount = req.amount, "payment intent created");
        Ok(intent_id)
    }

    async fn create_token(&self, card: &CardDetails) -> Result<String> {
        let params = vec![
            ("card[number]".to_owned(), card.number.expose_secret().to_owned()),
            ("card[exp_month]".to_owned(), card.expiry_month.clone()),
            ("card[exp_year]".to_owned(), card.expiry_year.clone()),
            ("card[cvc]".to_owned(), card.cvv.expose_secret().to_owned()),
        ];

        let body = self
            .post_form("/v1/tokens", &params)
            .await
            .map_err(|e| Error::Tokenization(e.to_string()))?;
        Self::extract_str(&body, "id", "/v1/tokens")
            .map_err(|e| Error::Tokenization(e.to_string()))
    }

    async fn confirm_intent(&self, intent_id: &str, token: &str) -> Result<IntentStatus> {
        // 1. Create a payment method from the single-use token.
        let params = vec![
            ("type".to_owned(), "card".to_owned()),
            ("card[token]".to_owned(), token.to_owned()),
        ];
        let body = self
            .post_form("/v1/payment_methods", &params)
            .await
            .map_err(|e| Error::Charge(e.to_string()))?;
        let method_id = Self::extract_str(&body, "id", "/v1/payment_methods")
            .map_err(|e| Error::Charge(e.to_string()))?;

        // 2. Confirm the pre-created intent with the new payment method.
        let params = vec![("payment_method".to_owned(), method_id)];
        let path = format!("/v1/payment_intents/{intent_id}/confirm");
        let body = self
            .post_form(&path, &params)
            .await
            .map_err(|e| Error::Charge(e.to_string()))?;
        let status = Self::extract_str(&body, "status", &path)
            .map_err(|e| Error::Charge(e.to_string()))?;

        tracing::info!(intent_id, status = %status, "payment intent confirmed");
        Ok(IntentStatus::from_wire(&status))
    }

    fn processor_id(&self) -> &str {
        "stripe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_without_key_is_a_config_error() {
        let cfg = ProcessorConfig {
            // Point at an env var that is certainly unset.
            secret_key_env: "VX_TEST_NO_SUCH_KEY".into(),
            ..Default::default()
        };
        let err = StripeProcessor::from_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn debug_output_redacts_secret_key() {
        let cfg = ProcessorConfig {
            secret_key: Some("sk_test_abc".into()),
            ..Default::default()
        };
        let processor = StripeProcessor::from_config(&cfg).unwrap();
        assert!(!format!("{processor:?}").contains("sk_test_abc"));
    }

    #[test]
    fn from_config_with_inline_key() {
        let cfg = ProcessorConfig {
            secret_key: Some("sk_test_abc".into()),
            ..Default::default()
        };
        let processor = StripeProcessor::from_config(&cfg).unwrap();
        assert_eq!(processor.processor_id(), "stripe");
        assert_eq!(processor.base_url, "https://api.stripe.com");
    }
}
