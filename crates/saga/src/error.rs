//! Saga error types.

use thiserror::Error;

use crate::event::SagaEvent;
use crate::state::SagaState;

/// Errors that can occur inside the saga core.
///
/// None of these escape [`crate::SagaOrchestrator::execute`]; the
/// orchestrator folds every failure into an internal-error result.
#[derive(Debug, Error)]
pub enum SagaError {
    /// An event was fired against a state with no matching table entry.
    #[error("transition rejected: event {event} not accepted in state {state}")]
    TransitionRejected { state: SagaState, event: SagaEvent },

    /// The validation collaborator failed or was unreachable.
    #[error("validation service error: {0}")]
    ValidationService(String),

    /// The persistence collaborator failed or was unreachable.
    #[error("persistence service error: {0}")]
    PersistenceService(String),

    /// The asset-debit collaborator failed or was unreachable.
    #[error("asset service error: {0}")]
    AssetService(String),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
