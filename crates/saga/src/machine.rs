//! Per-request saga machine instance.

use std::sync::Arc;

use contracts::SendMessageCommand;
use envelope::Envelope;

use common::CorrelationId;

use crate::error::SagaError;
use crate::event::SagaEvent;
use crate::state::SagaState;
use crate::transition::{StepAction, TransitionTable};

/// Per-instance context handed by reference into every step handler.
///
/// Holds the root command envelope for the whole run; handlers derive
/// their outbound envelopes from it via `next`.
#[derive(Debug, Clone)]
pub struct SagaContext {
    pub root: Envelope<SendMessageCommand>,
}

impl SagaContext {
    /// Creates the context for one saga run.
    pub fn new(root: Envelope<SendMessageCommand>) -> Self {
        Self { root }
    }

    /// Returns the correlation id identifying this run.
    pub fn correlation_id(&self) -> CorrelationId {
        self.root.correlation_id()
    }
}

/// A settled transition: the states involved and the action to run next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub from: SagaState,
    pub to: SagaState,
    pub action: Option<StepAction>,
}

/// One state machine instance, created per incoming command.
///
/// The instance id is the saga's correlation id, which makes concurrent
/// instances disjoint by construction. State is mutated only through
/// [`SagaMachine::apply`], and `apply` returns only once the transition
/// has fully settled. Callers sequence the next event strictly after
/// that return, which is what keeps transitions serial without timing
/// assumptions.
#[derive(Debug)]
pub struct SagaMachine {
    id: CorrelationId,
    state: SagaState,
    table: Arc<TransitionTable>,
}

impl SagaMachine {
    /// Creates a machine in the initial state.
    pub fn new(id: CorrelationId, table: Arc<TransitionTable>) -> Self {
        Self {
            id,
            state: SagaState::Ready,
            table,
        }
    }

    /// Returns the instance id (the saga's correlation id).
    pub fn id(&self) -> CorrelationId {
        self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Applies one event against the transition table.
    ///
    /// On acceptance the state change is complete before this returns; the
    /// returned [`Applied`] names the action the caller must run next, if
    /// any. Pairs the table does not accept leave the state untouched and
    /// surface as [`SagaError::TransitionRejected`].
    pub fn apply(&mut self, event: SagaEvent) -> Result<Applied, SagaError> {
        let Some(transition) = self.table.lookup(self.state, event) else {
            return Err(SagaError::TransitionRejected {
                state: self.state,
                event,
            });
        };

        let applied = Applied {
            from: self.state,
            to: transition.target,
            action: transition.action,
        };
        self.state = transition.target;

        tracing::debug!(
            saga_id = %self.id,
            from = %applied.from,
            to = %applied.to,
            event = %event,
            "transition applied"
        );

        Ok(applied)
    }
}
