//! Saga state machine events.

use serde::{Deserialize, Serialize};

/// Events that drive a send-message saga between states.
///
/// Exactly one event is in flight per instance at any time; the driver
/// loop applies a transition to completion before the next event is
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SagaEvent {
    /// Kick off the validation step from the initial state.
    StartValidation,

    /// The validator accepted the command.
    ValidationOk,

    /// The validator rejected the command.
    ValidationFail,

    /// Persistence and debit both completed.
    ProcessingOk,

    /// The asset service explicitly refused the debit.
    ProcessingResourceFail,

    /// A step failed unexpectedly; escape to the internal-error state.
    ProcessingInternalFail,
}

impl SagaEvent {
    /// All declared events, in declaration order.
    pub const ALL: [SagaEvent; 6] = [
        SagaEvent::StartValidation,
        SagaEvent::ValidationOk,
        SagaEvent::ValidationFail,
        SagaEvent::ProcessingOk,
        SagaEvent::ProcessingResourceFail,
        SagaEvent::ProcessingInternalFail,
    ];

    /// Returns the event name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaEvent::StartValidation => "StartValidation",
            SagaEvent::ValidationOk => "ValidationOk",
            SagaEvent::ValidationFail => "ValidationFail",
            SagaEvent::ProcessingOk => "ProcessingOk",
            SagaEvent::ProcessingResourceFail => "ProcessingResourceFail",
            SagaEvent::ProcessingInternalFail => "ProcessingInternalFail",
        }
    }
}

impl std::fmt::Display for SagaEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
