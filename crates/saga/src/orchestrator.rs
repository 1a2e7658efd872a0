//! Synchronous facade over the per-instance saga machine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use contracts::event_types::{self, layers};
use contracts::{SendMessageCommand, SendMessageResult};
use envelope::Envelope;

use crate::event::SagaEvent;
use crate::handlers::StepHandlers;
use crate::machine::{SagaContext, SagaMachine};
use crate::send_message;
use crate::services::{AssetDebiter, MessagePersistor, Validator};
use crate::state::SagaState;
use crate::transition::TransitionTable;

/// How long one `execute` call may block before resolving to an
/// internal-error result.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of the per-instance event queue. One event is in flight at a
/// time, so this only needs to absorb the hand-off between the handler
/// finishing and the driver picking the event up.
const EVENT_QUEUE_CAPACITY: usize = 4;

/// Callback invoked per instance after each settled transition.
pub type TransitionObserver = Arc<dyn Fn(SagaState, SagaState) + Send + Sync>;

/// What the driver reports when an instance stops.
#[derive(Debug)]
struct DriverOutcome {
    terminal: SagaState,
    failure: Option<String>,
}

/// Orchestrates one send-message saga per `execute` call.
///
/// Each call creates a fresh machine instance keyed by a newly generated
/// correlation id, drives it through the shared transition table on a
/// dedicated task, and blocks the caller until the instance reaches a
/// terminal state or the timeout elapses. Instances never outlive their
/// call: on every exit path the driver task has either finished or is
/// aborted.
pub struct SagaOrchestrator<V, P, D> {
    table: Arc<TransitionTable>,
    handlers: Arc<StepHandlers<V, P, D>>,
    timeout: Duration,
}

impl<V, P, D> SagaOrchestrator<V, P, D>
where
    V: Validator + 'static,
    P: MessagePersistor + 'static,
    D: AssetDebiter + 'static,
{
    /// Creates an orchestrator with the default 10-second timeout.
    pub fn new(validator: V, persistor: P, debiter: D) -> Self {
        Self {
            table: Arc::new(TransitionTable::send_message()),
            handlers: Arc::new(StepHandlers::new(validator, persistor, debiter)),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the completion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the send-message saga to exactly one terminal outcome.
    ///
    /// Never returns an error and never blocks past the configured
    /// timeout: domain rejections, collaborator faults, protocol
    /// violations, and timeouts all map to one of the four result
    /// variants, wrapped in an envelope chained from the root.
    #[tracing::instrument(skip(self, command), fields(saga_type = send_message::SAGA_TYPE))]
    pub async fn execute(
        &self,
        command: SendMessageCommand,
        actor_id: &str,
    ) -> Envelope<SendMessageResult> {
        self.execute_observed(command, actor_id, None).await
    }

    /// Like [`SagaOrchestrator::execute`], with a per-instance observer
    /// notified after each settled transition.
    pub async fn execute_observed(
        &self,
        command: SendMessageCommand,
        actor_id: &str,
        observer: Option<TransitionObserver>,
    ) -> Envelope<SendMessageResult> {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = std::time::Instant::now();

        let root = Envelope::new_root(
            event_types::SEND_MESSAGE_CMD,
            layers::APP,
            "SagaOrchestrator",
            actor_id,
            command,
        );
        let correlation_id = root.correlation_id();
        tracing::info!(saga_id = %correlation_id, "saga started");

        let machine = SagaMachine::new(correlation_id, self.table.clone());
        let ctx = SagaContext::new(root.clone());

        let (event_tx, event_rx) = mpsc::channel::<SagaEvent>(EVENT_QUEUE_CAPACITY);
        let (done_tx, done_rx) = oneshot::channel::<DriverOutcome>();

        let driver = tokio::spawn(drive(
            machine,
            ctx,
            self.handlers.clone(),
            event_rx,
            event_tx.clone(),
            done_tx,
            observer,
        ));

        let result = if event_tx.send(SagaEvent::StartValidation).await.is_err() {
            // The driver died before accepting the start event.
            SendMessageResult::internal_error(correlation_id, "saga driver unavailable")
        } else {
            // Our sender must drop so the driver's queue can drain on
            // completion; the driver holds its own clone for hand-offs.
            drop(event_tx);

            match tokio::time::timeout(self.timeout, done_rx).await {
                Ok(Ok(outcome)) => self.resolve(correlation_id, outcome),
                Ok(Err(_)) => {
                    tracing::error!(saga_id = %correlation_id, "saga driver stopped without an outcome");
                    SendMessageResult::internal_error(correlation_id, "saga driver stopped unexpectedly")
                }
                Err(_) => {
                    // Stop the instance so no background work keeps
                    // touching collaborators after the caller gives up.
                    driver.abort();
                    metrics::counter!("saga_timeouts_total").increment(1);
                    tracing::warn!(
                        saga_id = %correlation_id,
                        timeout_secs = self.timeout.as_secs_f64(),
                        "saga timed out, instance aborted"
                    );
                    SendMessageResult::internal_error(
                        correlation_id,
                        format!("saga timed out after {:.1}s", self.timeout.as_secs_f64()),
                    )
                }
            }
        };

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        if result.is_success() {
            metrics::counter!("saga_completed").increment(1);
            tracing::info!(saga_id = %correlation_id, duration, "saga completed");
        } else {
            metrics::counter!("saga_failed").increment(1);
            tracing::info!(saga_id = %correlation_id, duration, status = result.status(), "saga did not complete");
        }

        result_envelope(&root, result)
    }

    fn resolve(
        &self,
        correlation_id: common::CorrelationId,
        outcome: DriverOutcome,
    ) -> SendMessageResult {
        match outcome.terminal {
            SagaState::Success => SendMessageResult::completed(correlation_id),
            SagaState::ValidationFailed => SendMessageResult::validation_failed(correlation_id),
            SagaState::ResourceFailed => SendMessageResult::insufficient_asset(correlation_id),
            _ => SendMessageResult::internal_error(
                correlation_id,
                outcome
                    .failure
                    .unwrap_or_else(|| "Internal Server Error".to_string()),
            ),
        }
    }
}

/// Wraps a terminal result into an envelope chained from the root.
fn result_envelope(
    root: &Envelope<SendMessageCommand>,
    result: SendMessageResult,
) -> Envelope<SendMessageResult> {
    let event_type = match &result {
        SendMessageResult::Completed(_) => event_types::SEND_MESSAGE_COMPLETED_EVT,
        SendMessageResult::ValidationFailed(_) => event_types::VALIDATION_FAILED_EVT,
        SendMessageResult::InsufficientAsset(_) => event_types::INSUFFICIENT_ASSET_EVT,
        SendMessageResult::InternalError(_) => event_types::INTERNAL_SERVER_ERROR_EVT,
    };
    root.next(event_type, layers::APP, "SagaOrchestrator", result)
}

/// Per-instance driver: the single consumer of this instance's events.
///
/// Applies each event to the machine, and only then runs the transition's
/// action and feeds the resulting event back through the queue. `apply`
/// returning is the acknowledgment that the transition has settled, so an
/// event can never catch the machine mid-transition and exactly one event
/// is in flight per instance.
async fn drive<V, P, D>(
    mut machine: SagaMachine,
    ctx: SagaContext,
    handlers: Arc<StepHandlers<V, P, D>>,
    mut event_rx: mpsc::Receiver<SagaEvent>,
    event_tx: mpsc::Sender<SagaEvent>,
    done_tx: oneshot::Sender<DriverOutcome>,
    observer: Option<TransitionObserver>,
) where
    V: Validator,
    P: MessagePersistor,
    D: AssetDebiter,
{
    let mut failure: Option<String> = None;

    let terminal = loop {
        let Some(event) = event_rx.recv().await else {
            // Every sender is gone with the machine still mid-flight.
            break SagaState::InternalError;
        };

        let applied = match machine.apply(event) {
            Ok(applied) => applied,
            Err(e) => {
                // Protocol violation: escalate instead of dropping the
                // event silently. The escape rule exists in every
                // non-terminal state, and terminal states end the loop
                // below, so the second apply cannot be rejected.
                tracing::error!(saga_id = %machine.id(), error = %e, "illegal event, escalating");
                failure.get_or_insert_with(|| e.to_string());
                match machine.apply(SagaEvent::ProcessingInternalFail) {
                    Ok(applied) => applied,
                    Err(_) => break SagaState::InternalError,
                }
            }
        };

        if let Some(observer) = observer.as_deref() {
            observer(applied.from, applied.to);
        }

        if applied.to.is_terminal() {
            break applied.to;
        }

        if let Some(action) = applied.action {
            let outcome = handlers.run(action, &ctx).await;
            if let Some(detail) = outcome.detail {
                failure.get_or_insert(detail);
            }
            // The transition above has fully settled; hand the next event
            // to the queue rather than re-entering the machine directly.
            if event_tx.send(outcome.event).await.is_err() {
                break SagaState::InternalError;
            }
        }
    };

    let _ = done_tx.send(DriverOutcome { terminal, failure });
}
