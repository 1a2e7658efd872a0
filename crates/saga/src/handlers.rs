//! Step handlers: the orchestration actions attached to transitions.

use contracts::event_types::{self, layers};
use contracts::{ConsumeAsset, SaveChatMessage, ValidateMessage};

use crate::event::SagaEvent;
use crate::machine::SagaContext;
use crate::send_message;
use crate::services::{AssetDebiter, MessagePersistor, Validator};
use crate::transition::StepAction;

/// What a step handler decided: the event to fire next and, for internal
/// failures, a description that ends up in the caller-facing result.
#[derive(Debug, Clone)]
pub struct HandlerOutcome {
    pub event: SagaEvent,
    pub detail: Option<String>,
}

impl HandlerOutcome {
    fn event(event: SagaEvent) -> Self {
        Self {
            event,
            detail: None,
        }
    }

    fn internal_failure(detail: impl Into<String>) -> Self {
        Self {
            event: SagaEvent::ProcessingInternalFail,
            detail: Some(detail.into()),
        }
    }
}

/// The two orchestration actions, bound to their collaborators.
///
/// Every handler is a total function from collaborator outcomes to the
/// next event: collaborator faults fold into the internal-failure event
/// instead of escaping to the driver.
pub struct StepHandlers<V, P, D> {
    validator: V,
    persistor: P,
    debiter: D,
}

impl<V, P, D> StepHandlers<V, P, D>
where
    V: Validator,
    P: MessagePersistor,
    D: AssetDebiter,
{
    /// Binds the handlers to their collaborators.
    pub fn new(validator: V, persistor: P, debiter: D) -> Self {
        Self {
            validator,
            persistor,
            debiter,
        }
    }

    /// Runs the action attached to a settled transition.
    pub async fn run(&self, action: StepAction, ctx: &SagaContext) -> HandlerOutcome {
        match action {
            StepAction::Validate => self.validate(ctx).await,
            StepAction::PersistAndDebit => self.persist_and_debit(ctx).await,
        }
    }

    /// Validation step: one call to the validator, no retries.
    async fn validate(&self, ctx: &SagaContext) -> HandlerOutcome {
        tracing::info!(
            saga_id = %ctx.correlation_id(),
            step = send_message::STEP_VALIDATE,
            "saga step started"
        );

        let request = ctx.root.next(
            event_types::VALIDATE_MESSAGE_CMD,
            layers::DA,
            "SendMessageAgent",
            ValidateMessage::from_command(&ctx.root.payload),
        );

        match self.validator.validate(request).await {
            Ok(outcome) if outcome.payload.is_valid => HandlerOutcome::event(SagaEvent::ValidationOk),
            Ok(outcome) => {
                tracing::info!(
                    saga_id = %ctx.correlation_id(),
                    error_code = outcome.payload.error_code.as_deref().unwrap_or("unknown"),
                    "validation rejected command"
                );
                HandlerOutcome::event(SagaEvent::ValidationFail)
            }
            Err(e) => {
                tracing::error!(saga_id = %ctx.correlation_id(), error = %e, "validation step failed");
                HandlerOutcome::internal_failure(e.to_string())
            }
        }
    }

    /// Persist-then-debit step.
    ///
    /// Persistence must settle before the debit begins: an unrecorded
    /// message must never cost the user an asset. A persistence failure
    /// folds into an internal failure and short-circuits the debit; the
    /// resource-failure outcome is reserved for the debit itself.
    async fn persist_and_debit(&self, ctx: &SagaContext) -> HandlerOutcome {
        tracing::info!(
            saga_id = %ctx.correlation_id(),
            step = send_message::STEP_PERSIST_AND_DEBIT,
            "saga step started"
        );

        let save_request = ctx.root.next(
            event_types::SAVE_CHAT_MESSAGE_CMD,
            layers::DA,
            "SendMessageAgent",
            SaveChatMessage::from_command(&ctx.root.payload),
        );

        let stored = match self.persistor.save(save_request).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(saga_id = %ctx.correlation_id(), error = %e, "persistence step failed");
                return HandlerOutcome::internal_failure(e.to_string());
            }
        };
        tracing::debug!(
            saga_id = %ctx.correlation_id(),
            stored_reference = %stored.payload.stored_reference,
            "message persisted"
        );

        let consume_request = ctx.root.next(
            event_types::CONSUME_ASSET_CMD,
            layers::DA,
            "SendMessageAgent",
            ConsumeAsset::from_command(&ctx.root.payload, ctx.correlation_id()),
        );

        match self.debiter.consume(consume_request).await {
            Ok(consumed) if consumed.payload.is_success => {
                HandlerOutcome::event(SagaEvent::ProcessingOk)
            }
            Ok(consumed) => {
                tracing::warn!(
                    saga_id = %ctx.correlation_id(),
                    error_code = consumed.payload.error_code.as_deref().unwrap_or("unknown"),
                    "asset debit refused"
                );
                HandlerOutcome::event(SagaEvent::ProcessingResourceFail)
            }
            Err(e) => {
                tracing::error!(saga_id = %ctx.correlation_id(), error = %e, "asset debit step failed");
                HandlerOutcome::internal_failure(e.to_string())
            }
        }
    }
}
