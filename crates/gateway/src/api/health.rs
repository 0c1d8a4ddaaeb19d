//! `GET /v1/health` — liveness probe.

use axum::extract::State;
use axum::Json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "processor": state.processor.processor_id(),
        "active_sessions": state.sessions.len(),
    }))
}
