//! Saga state machine states.

use serde::{Deserialize, Serialize};

/// The state of a send-message saga in its lifecycle.
///
/// State transitions:
/// ```text
/// Ready ──► Validating ──┬──► Processing ──┬──► Success
///    │           │       │        │        ├──► ResourceFailed
///    │           │       └──► ValidationFailed
///    └───────────┴────────────────┴──► InternalError
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// Instance created, waiting for the start event.
    #[default]
    Ready,

    /// The validation step is running.
    Validating,

    /// The persist-and-debit step is running.
    Processing,

    /// Message recorded and asset debited (terminal state).
    Success,

    /// The command failed validation (terminal state).
    ValidationFailed,

    /// The asset service refused the debit (terminal state).
    ResourceFailed,

    /// The saga failed for an unexpected reason (terminal state).
    InternalError,
}

impl SagaState {
    /// All declared states, in declaration order.
    pub const ALL: [SagaState; 7] = [
        SagaState::Ready,
        SagaState::Validating,
        SagaState::Processing,
        SagaState::Success,
        SagaState::ValidationFailed,
        SagaState::ResourceFailed,
        SagaState::InternalError,
    ];

    /// Returns true if this is a terminal state (no outgoing transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SagaState::Success
                | SagaState::ValidationFailed
                | SagaState::ResourceFailed
                | SagaState::InternalError
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Ready => "Ready",
            SagaState::Validating => "Validating",
            SagaState::Processing => "Processing",
            SagaState::Success => "Success",
            SagaState::ValidationFailed => "ValidationFailed",
            SagaState::ResourceFailed => "ResourceFailed",
            SagaState::InternalError => "InternalError",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_ready() {
        assert_eq!(SagaState::default(), SagaState::Ready);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SagaState::Ready.is_terminal());
        assert!(!SagaState::Validating.is_terminal());
        assert!(!SagaState::Processing.is_terminal());
        assert!(SagaState::Success.is_terminal());
        assert!(SagaState::ValidationFailed.is_terminal());
        assert!(SagaState::ResourceFailed.is_terminal());
        assert!(SagaState::InternalError.is_terminal());
    }

    #[test]
    fn test_all_enumerates_every_state() {
        assert_eq!(SagaState::ALL.len(), 7);
        assert_eq!(SagaState::ALL.iter().filter(|s| s.is_terminal()).count(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(SagaState::Ready.to_string(), "Ready");
        assert_eq!(SagaState::Validating.to_string(), "Validating");
        assert_eq!(SagaState::Processing.to_string(), "Processing");
        assert_eq!(SagaState::Success.to_string(), "Success");
        assert_eq!(SagaState::ValidationFailed.to_string(), "ValidationFailed");
        assert_eq!(SagaState::ResourceFailed.to_string(), "ResourceFailed");
        assert_eq!(SagaState::InternalError.to_string(), "InternalError");
    }

    #[test]
    fn test_serialization() {
        let state = SagaState::Processing;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: SagaState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
