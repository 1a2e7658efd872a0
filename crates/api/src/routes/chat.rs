//! Send-message endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use contracts::{SendMessageCommand, SendMessageResult};
use envelope::Envelope;
use saga::{AssetDebiter, MessagePersistor, SagaOrchestrator, Validator};

use crate::error::ApiError;

/// Header carrying the authenticated actor identity.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Shared application state accessible from all handlers.
pub struct AppState<V, P, D> {
    pub orchestrator: SagaOrchestrator<V, P, D>,
}

/// POST /api/v1/chat/send — runs the send-message saga to completion.
///
/// The response body is always the full result envelope; the status code
/// follows the outcome: 200 for success, 422 for domain failures, 500
/// for internal errors.
#[tracing::instrument(skip(state, headers, command))]
pub async fn send<V, P, D>(
    State(state): State<Arc<AppState<V, P, D>>>,
    headers: HeaderMap,
    Json(command): Json<SendMessageCommand>,
) -> Result<(StatusCode, Json<Envelope<SendMessageResult>>), ApiError>
where
    V: Validator + 'static,
    P: MessagePersistor + 'static,
    D: AssetDebiter + 'static,
{
    let actor_id = headers
        .get(ACTOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing {ACTOR_ID_HEADER} header")))?
        .to_string();

    let result = state.orchestrator.execute(command, &actor_id).await;

    let status = match &result.payload {
        SendMessageResult::Completed(_) => StatusCode::OK,
        SendMessageResult::ValidationFailed(_) | SendMessageResult::InsufficientAsset(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SendMessageResult::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    Ok((status, Json(result)))
}
