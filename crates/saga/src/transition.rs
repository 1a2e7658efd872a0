//! The static transition table for the send-message saga.

use std::collections::HashMap;

use crate::event::SagaEvent;
use crate::state::SagaState;

/// The orchestration action attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// Run the validation step handler.
    Validate,
    /// Run the persist-then-debit step handler.
    PersistAndDebit,
}

impl StepAction {
    /// Returns the action name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::Validate => "validate",
            StepAction::PersistAndDebit => "persist_and_debit",
        }
    }
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single accepted `(state, event)` rule: an optional action to run and
/// the state entered once the transition is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: Option<StepAction>,
    pub target: SagaState,
}

/// Immutable mapping of `(state, event)` pairs to transitions.
///
/// Declared once at process start and shared read-only by every saga
/// instance. Any pair not in the table is a rejection, which is the
/// mechanism that catches out-of-order or duplicate event delivery.
/// Terminal states have no outgoing entries.
#[derive(Debug)]
pub struct TransitionTable {
    rules: HashMap<(SagaState, SagaEvent), Transition>,
}

impl TransitionTable {
    /// Builds the transition table for the send-message saga.
    ///
    /// Every non-terminal state has an internal-failure escape so a step
    /// handler can always report an unexpected fault, whatever state the
    /// machine is in when the fault surfaces.
    pub fn send_message() -> Self {
        let mut table = Self {
            rules: HashMap::new(),
        };

        table.rule(
            SagaState::Ready,
            SagaEvent::StartValidation,
            Some(StepAction::Validate),
            SagaState::Validating,
        );
        table.rule(
            SagaState::Ready,
            SagaEvent::ProcessingInternalFail,
            None,
            SagaState::InternalError,
        );

        table.rule(
            SagaState::Validating,
            SagaEvent::ValidationOk,
            Some(StepAction::PersistAndDebit),
            SagaState::Processing,
        );
        table.rule(
            SagaState::Validating,
            SagaEvent::ValidationFail,
            None,
            SagaState::ValidationFailed,
        );
        table.rule(
            SagaState::Validating,
            SagaEvent::ProcessingInternalFail,
            None,
            SagaState::InternalError,
        );

        table.rule(
            SagaState::Processing,
            SagaEvent::ProcessingOk,
            None,
            SagaState::Success,
        );
        table.rule(
            SagaState::Processing,
            SagaEvent::ProcessingResourceFail,
            None,
            SagaState::ResourceFailed,
        );
        table.rule(
            SagaState::Processing,
            SagaEvent::ProcessingInternalFail,
            None,
            SagaState::InternalError,
        );

        table.check();
        table
    }

    fn rule(
        &mut self,
        source: SagaState,
        event: SagaEvent,
        action: Option<StepAction>,
        target: SagaState,
    ) {
        let previous = self.rules.insert((source, event), Transition { action, target });
        assert!(
            previous.is_none(),
            "duplicate transition rule for ({source}, {event})"
        );
    }

    /// Startup wiring check: terminal states must be closed and every
    /// non-terminal state must have the internal-failure escape.
    fn check(&self) {
        for ((source, _), _) in &self.rules {
            assert!(
                !source.is_terminal(),
                "terminal state {source} must have no outgoing transitions"
            );
        }
        for state in SagaState::ALL {
            if !state.is_terminal() {
                assert!(
                    self.lookup(state, SagaEvent::ProcessingInternalFail)
                        .is_some(),
                    "state {state} is missing the internal-failure escape"
                );
            }
        }
    }

    /// Looks up the transition for a `(state, event)` pair.
    ///
    /// Returns `None` for any pair the table does not accept.
    pub fn lookup(&self, state: SagaState, event: SagaEvent) -> Option<&Transition> {
        self.rules.get(&(state, event))
    }

    /// Returns the number of accepted `(state, event)` pairs.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
