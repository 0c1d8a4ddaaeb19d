//! `POST /v1/payments/intent` — open a payment dialog for a live call.
//!
//! The agent calls this before transferring the caller to the gather URL.
//! It creates the processor-side payment intent, records a pending
//! transaction, and opens the call session that the telephony endpoints
//! operate on.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use vx_domain::transaction::Transaction;
use vx_processor::IntentRequest;
use vx_sessions::SessionCreate;

use super::api_error;
use crate::runtime::flow;
use crate::state::AppState;

/// Amounts arrive as integers or as decimal digit strings depending on the
/// agent integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Int(i64),
    Str(String),
}

impl Amount {
    fn minor_units(&self) -> Option<i64> {
        match self {
            Amount::Int(v) => Some(*v),
            Amount::Str(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub call_sid: String,
    pub amount: Amount,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub callback_url: String,
}

fn default_currency() -> String {
    "usd".to_owned()
}

pub async fn create_intent(
    State(state): State<AppState>,
    Json(req): Json<CreateIntentRequest>,
) -> Response {
    if req.call_sid.is_empty() || req.callback_url.is_empty() {
        return api_error(
            StatusCode::BAD_REQUEST,
            "Missing required fields: call_sid, amount, callback_url",
        );
    }
    let Some(amount) = req.amount.minor_units().filter(|a| *a > 0) else {
        return api_error(StatusCode::BAD_REQUEST, "Invalid amount");
    };
    let currency = req.currency.to_lowercase();

    let destination = state.config.processor.destination_account.clone();
    let intent_id = match state
        .processor
        .create_intent(IntentRequest {
            amount,
            currency: currency.clone(),
            destination_account: destination.clone(),
        })
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(call_sid = %req.call_sid, error = %e, "intent creation failed");
            return api_error(StatusCode::BAD_GATEWAY, "Payment intent creation failed");
        }
    };

    let tx = Transaction::pending(amount, &currency, &intent_id, destination);
    let transaction_id = tx.id;
    state.transactions.insert(tx);

    state.sessions.create(
        &req.call_sid,
        SessionCreate {
            amount,
            currency,
            intent_id,
            transaction_id,
            callback_url: req.callback_url,
        },
    );
    tracing::info!(
        call_sid = %req.call_sid,
        transaction_id = %transaction_id,
        amount,
        "payment dialog opened"
    );

    Json(serde_json::json!({
        "transaction_id": transaction_id,
        "redirect_url": state.public_url(flow::GATHER_PATH),
        "status": "pending",
    }))
    .into_response()
}
