//! Shared test fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;

use vx_domain::config::Config;
use vx_processor::{CardProcessor, MockProcessor};
use vx_sessions::{CallLockMap, SessionStore};

use crate::runtime::payment::PaymentOrchestrator;
use crate::runtime::transactions::{FileTransactionStore, TransactionStore};
use crate::runtime::webhook::WebhookDispatcher;
use crate::state::AppState;

/// An ephemeral HTTP server that records webhook deliveries.
pub(crate) struct HookServer {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
    pub last_body: Arc<Mutex<Option<String>>>,
}

/// Spawn a local hook receiver on an ephemeral port. It answers 200 to
/// every POST and records the hit count and the most recent body.
pub(crate) async fn spawn_hook_server() -> HookServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let last_body = Arc::new(Mutex::new(None));

    let hits_handler = hits.clone();
    let body_handler = last_body.clone();
    let app = Router::new().route(
        "/hook",
        post(move |body: String| {
            let hits = hits_handler.clone();
            let last = body_handler.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                *last.lock() = Some(body);
                StatusCode::OK
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    HookServer {
        url: format!("http://{addr}/hook"),
        hits,
        last_body,
    }
}

/// Build an [`AppState`] wired to a mock processor and a temp-dir
/// transaction store. The tempdir handle is returned so it outlives the
/// test body.
pub(crate) fn test_state(processor: Arc<MockProcessor>) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(Config::default());

    let transactions: Arc<dyn TransactionStore> =
        Arc::new(FileTransactionStore::new(dir.path()));
    let webhooks = Arc::new(WebhookDispatcher::for_tests(None, 1));
    let processor: Arc<dyn CardProcessor> = processor;
    let payments = Arc::new(PaymentOrchestrator::new(
        processor.clone(),
        transactions.clone(),
        webhooks.clone(),
    ));

    let state = AppState {
        config,
        sessions: Arc::new(SessionStore::new()),
        call_locks: Arc::new(CallLockMap::new()),
        transactions,
        processor,
        webhooks,
        payments,
        api_key_hash: None,
    };
    (state, dir)
}
