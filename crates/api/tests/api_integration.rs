//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{InMemoryAssetDebiter, InMemoryMessageStore, InMemoryValidator};
use tower::ServiceExt;

use api::routes::chat::AppState;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

type TestState = Arc<AppState<InMemoryValidator, InMemoryMessageStore, InMemoryAssetDebiter>>;

fn setup_with_state() -> (
    axum::Router,
    TestState,
    InMemoryValidator,
    InMemoryMessageStore,
    InMemoryAssetDebiter,
) {
    let (state, validator, persistor, debiter) =
        api::create_default_state(Duration::from_secs(2));
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state, validator, persistor, debiter)
}

fn setup() -> axum::Router {
    setup_with_state().0
}

fn send_request(actor: Option<&str>) -> Request<Body> {
    let body = serde_json::json!({
        "user_session_token": "sess-42",
        "character_id": "char-7",
        "message_type": "GIFT",
        "message_content": { "gift_id": "g001" },
        "idempotency_key": "idem-42",
        "trace_id": "client-trace-42"
    });

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/chat/send")
        .header("content-type", "application/json");
    if let Some(actor) = actor {
        builder = builder.header("X-Actor-ID", actor);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_send_message_success() {
    let (app, _, _, persistor, debiter) = setup_with_state();

    let response = app.oneshot(send_request(Some("user-42"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["payload"]["type"], "Completed");
    assert_eq!(json["payload"]["data"]["status"], "SUCCESS");
    assert_eq!(
        json["governance"]["security_context"]["actor_id"],
        "user-42"
    );
    // The result envelope is a non-root member of the causal chain.
    assert_ne!(json["trace"]["causation_id"], "root");

    assert_eq!(persistor.message_count(), 1);
    assert_eq!(debiter.debit_count(), 1);
}

#[tokio::test]
async fn test_send_message_validation_failure() {
    let (app, _, validator, persistor, _) = setup_with_state();
    validator.set_reject("INVALID_CONTENT");

    let response = app.oneshot(send_request(Some("user-42"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = response_json(response).await;
    assert_eq!(json["payload"]["type"], "ValidationFailed");
    assert_eq!(json["payload"]["data"]["error_code"], "VALIDATION_FAILED");

    assert_eq!(persistor.message_count(), 0);
}

#[tokio::test]
async fn test_send_message_insufficient_asset() {
    let (app, _, _, _, debiter) = setup_with_state();
    debiter.set_insufficient(true);

    let response = app.oneshot(send_request(Some("user-42"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = response_json(response).await;
    assert_eq!(json["payload"]["type"], "InsufficientAsset");
    assert_eq!(json["payload"]["data"]["error_code"], "INSUFFICIENT_ASSET");
}

#[tokio::test]
async fn test_send_message_internal_error() {
    let (app, _, _, persistor, _) = setup_with_state();
    persistor.set_fail_on_save(true);

    let response = app.oneshot(send_request(Some("user-42"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = response_json(response).await;
    assert_eq!(json["payload"]["type"], "InternalError");
    assert!(
        json["payload"]["data"]["message"]
            .as_str()
            .is_some_and(|m| !m.is_empty())
    );
}

#[tokio::test]
async fn test_send_message_missing_actor_header() {
    let app = setup();

    let response = app.oneshot(send_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert!(
        json["error"]
            .as_str()
            .is_some_and(|m| m.contains("x-actor-id"))
    );
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    // Run one saga so counters exist, then scrape.
    let _ = app
        .clone()
        .oneshot(send_request(Some("user-42")))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
