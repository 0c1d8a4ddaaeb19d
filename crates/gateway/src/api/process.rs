//! `POST /api/twilio/process` — consume one digit submission.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;

use super::gather::TelephonyParams;
use crate::runtime::digits;
use crate::state::AppState;

pub async fn process(
    State(state): State<AppState>,
    Form(params): Form<TelephonyParams>,
) -> Response {
    let Some(call_sid) = params.call_sid.filter(|s| !s.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing CallSid").into_response();
    };
    let digits = params.digits.unwrap_or_default();

    digits::process_digits(&state, &call_sid, &digits)
        .await
        .into_response()
}
