//! AppState construction and background-task spawning extracted from
//! `main.rs`.

use std::sync::Arc;

use anyhow::Context;

use vx_domain::config::{Config, ConfigSeverity, ProcessorMode};
use vx_processor::{CardProcessor, MockProcessor, StripeProcessor};
use vx_sessions::{CallLockMap, SessionStore};

use crate::api::auth;
use crate::runtime::payment::PaymentOrchestrator;
use crate::runtime::transactions::{FileTransactionStore, TransactionStore};
use crate::runtime::webhook::WebhookDispatcher;
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Transaction store ────────────────────────────────────────────
    let transactions: Arc<dyn TransactionStore> =
        Arc::new(FileTransactionStore::new(&config.storage.state_path));
    tracing::info!(path = %config.storage.state_path.display(), "transaction store ready");

    // ── Card processor ───────────────────────────────────────────────
    let processor: Arc<dyn CardProcessor> = match config.processor.mode {
        ProcessorMode::Live => Arc::new(
            StripeProcessor::from_config(&config.processor)
                .context("initializing card processor")?,
        ),
        ProcessorMode::Mock => Arc::new(MockProcessor::new()),
    };
    tracing::info!(processor = processor.processor_id(), "card processor ready");

    // ── Webhook dispatcher ───────────────────────────────────────────
    let webhooks = Arc::new(
        WebhookDispatcher::from_config(&config.webhook)
            .context("initializing webhook dispatcher")?,
    );

    // ── Payment orchestrator ─────────────────────────────────────────
    let payments = Arc::new(PaymentOrchestrator::new(
        processor.clone(),
        transactions.clone(),
        webhooks.clone(),
    ));

    // ── Intent API key ───────────────────────────────────────────────
    let api_key_hash = config
        .server
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| {
            std::env::var(&config.server.api_key_env)
                .ok()
                .filter(|k| !k.is_empty())
        })
        .map(|key| auth::key_hash(&key));
    if api_key_hash.is_none() {
        tracing::warn!(
            "intent API auth DISABLED — set server.api_key in config or the {} env var",
            config.server.api_key_env
        );
    }

    Ok(AppState {
        config,
        sessions: Arc::new(SessionStore::new()),
        call_locks: Arc::new(CallLockMap::new()),
        transactions,
        processor,
        webhooks,
        payments,
        api_key_hash,
    })
}

/// Spawn the gateway's periodic maintenance loops.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Periodic call-lock pruning ───────────────────────────────────
    {
        let call_locks = state.call_locks.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                call_locks.prune_idle();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_config_boots_with_mock_processor() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.state_path = dir.path().to_path_buf();

        let state = build_app_state(Arc::new(config)).unwrap();
        assert_eq!(state.processor.processor_id(), "mock");
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn invalid_config_is_refused() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(build_app_state(Arc::new(config)).is_err());
    }
}
