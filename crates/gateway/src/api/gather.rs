//! `POST|GET /api/twilio/gather` — render the digit-collection document.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::runtime::flow;
use crate::state::AppState;

/// Parameters the telephony provider posts with every call webhook. On a
/// GET fallback they arrive in the query string instead; the `Form`
/// extractor reads either.
#[derive(Debug, Deserialize)]
pub struct TelephonyParams {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "Digits")]
    pub digits: Option<String>,
}

pub async fn gather(
    State(state): State<AppState>,
    Form(params): Form<TelephonyParams>,
) -> Response {
    let Some(call_sid) = params.call_sid.filter(|s| !s.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing CallSid").into_response();
    };

    flow::render_gather(&state, &call_sid).into_response()
}
