pub mod auth;
pub mod gather;
pub mod health;
pub mod intent;
pub mod process;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;

/// Build the full API router.
///
/// The telephony routes are **public**: the provider fetches them and the
/// call identifier scopes every operation. The intent route is gated behind
/// the `x-api-key` middleware.
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        // The provider may fall back to GET when fetching gather documents.
        .route("/api/twilio/gather", post(gather::gather).get(gather::gather))
        .route("/api/twilio/process", post(process::process))
        .route("/v1/health", get(health::health));

    let protected = Router::new()
        .route("/v1/payments/intent", post(intent::create_intent))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_key,
        ));

    public.merge(protected)
}

/// Standard JSON error body: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
