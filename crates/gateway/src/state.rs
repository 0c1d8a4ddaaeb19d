//! Shared application state handed to every handler.

use std::sync::Arc;

use vx_domain::config::Config;
use vx_processor::CardProcessor;
use vx_sessions::{CallLockMap, SessionStore};

use crate::runtime::payment::PaymentOrchestrator;
use crate::runtime::transactions::TransactionStore;
use crate::runtime::webhook::WebhookDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub call_locks: Arc<CallLockMap>,
    pub transactions: Arc<dyn TransactionStore>,
    pub processor: Arc<dyn CardProcessor>,
    pub webhooks: Arc<WebhookDispatcher>,
    pub payments: Arc<PaymentOrchestrator>,
    /// SHA-256 of the intent API key. `None` disables auth (dev mode).
    pub api_key_hash: Option<Vec<u8>>,
}

impl AppState {
    /// Absolute URL for a gateway path, rooted at the configured public URL.
    pub fn public_url(&self, path: &str) -> String {
        let base = self.config.server.public_url.trim_end_matches('/');
        format!("{base}{path}")
    }
}
