//! API authentication middleware.
//!
//! The intent key comes from `server.api_key` or the env var named by
//! `server.api_key_env` (default `VORTEX_API_KEY`), read **once at startup**
//! and cached as a SHA-256 digest in `AppState`.
//! - With a key configured, every protected request must carry it in the
//!   `x-api-key` header.
//! - Without one, the server logs a warning once and allows
//!   unauthenticated access (dev mode).

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Axum middleware that enforces `x-api-key` authentication on protected
/// routes. Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // `api_key_hash` is `None` in dev mode (no key configured).
    let expected_hash = match &state.api_key_hash {
        Some(h) => h,
        None => return next.run(req).await,
    };

    let provided = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    // Hash the provided key to a fixed-length digest, then compare in
    // constant time. This avoids leaking the key length.
    let provided_hash = Sha256::digest(provided.as_bytes());

    if !bool::from(provided_hash.ct_eq(expected_hash.as_slice())) {
        return super::api_error(
            axum::http::StatusCode::UNAUTHORIZED,
            "invalid or missing API key",
        );
    }

    next.run(req).await
}

/// SHA-256 digest of an API key, as stored in `AppState`.
pub fn key_hash(key: &str) -> Vec<u8> {
    Sha256::digest(key.as_bytes()).to_vec()
}
