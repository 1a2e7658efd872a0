//! HTTP adapter for the send-message saga.
//!
//! Exposes the saga orchestrator over REST with structured logging
//! (tracing) and Prometheus metrics. The adapter is deliberately thin:
//! it extracts the command and actor identity, invokes the orchestrator,
//! and maps the terminal result envelope to a transport status code.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    AssetDebiter, InMemoryAssetDebiter, InMemoryMessageStore, InMemoryValidator,
    MessagePersistor, SagaOrchestrator, Validator,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
use routes::chat::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<V, P, D>(
    state: Arc<AppState<V, P, D>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    V: Validator + 'static,
    P: MessagePersistor + 'static,
    D: AssetDebiter + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/v1/chat/send", post(routes::chat::send::<V, P, D>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state with in-memory collaborators.
///
/// Returns the collaborator handles alongside the state so callers (and
/// tests) can reach their toggles and counters.
pub fn create_default_state(
    saga_timeout: Duration,
) -> (
    Arc<AppState<InMemoryValidator, InMemoryMessageStore, InMemoryAssetDebiter>>,
    InMemoryValidator,
    InMemoryMessageStore,
    InMemoryAssetDebiter,
) {
    let validator = InMemoryValidator::new();
    let persistor = InMemoryMessageStore::new();
    let debiter = InMemoryAssetDebiter::new();

    let orchestrator =
        SagaOrchestrator::new(validator.clone(), persistor.clone(), debiter.clone())
            .with_timeout(saga_timeout);

    let state = Arc::new(AppState { orchestrator });

    (state, validator, persistor, debiter)
}
