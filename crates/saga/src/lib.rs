//! Saga orchestration core for the send-message transaction.
//!
//! One incoming command becomes one saga instance: a finite-state machine
//! driven through a static transition table by two step handlers
//! (validate, then persist-and-debit), resolving to exactly one of four
//! terminal outcomes. The [`SagaOrchestrator`] is the synchronous facade:
//! callers block on `execute` while the instance runs event-driven on its
//! own task, bounded by a timeout.

pub mod error;
pub mod event;
pub mod handlers;
pub mod machine;
pub mod orchestrator;
pub mod send_message;
pub mod services;
pub mod state;
pub mod transition;

pub use error::SagaError;
pub use event::SagaEvent;
pub use handlers::{HandlerOutcome, StepHandlers};
pub use machine::{Applied, SagaContext, SagaMachine};
pub use orchestrator::{DEFAULT_TIMEOUT, SagaOrchestrator, TransitionObserver};
pub use services::{
    AssetDebiter, InMemoryAssetDebiter, InMemoryMessageStore, InMemoryValidator, MessagePersistor,
    Validator,
};
pub use state::SagaState;
pub use transition::{StepAction, Transition, TransitionTable};
