//! Validation collaborator trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use contracts::event_types::{self, layers};
use contracts::{ValidateMessage, ValidationOutcome};
use envelope::{Envelope, TraceHeader};

use crate::error::SagaError;

/// Trait for the message-validation collaborator.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validates a message command, returning the outcome document.
    ///
    /// A domain rejection is an `Ok` envelope with `is_valid == false`; an
    /// `Err` means the collaborator itself failed.
    async fn validate(
        &self,
        envelope: Envelope<ValidateMessage>,
    ) -> Result<Envelope<ValidationOutcome>, SagaError>;
}

#[derive(Debug, Default)]
struct InMemoryValidatorState {
    reject_with: Option<String>,
    fail_on_validate: bool,
    seen_traces: Vec<TraceHeader>,
}

/// In-memory validator for testing and local wiring.
///
/// Accepts everything by default; [`InMemoryValidator::set_reject`] makes
/// it reject with a given error code, and
/// [`InMemoryValidator::set_fail_on_validate`] makes the collaborator
/// itself fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryValidator {
    state: Arc<RwLock<InMemoryValidatorState>>,
}

impl InMemoryValidator {
    /// Creates a new in-memory validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the validator to reject commands with the given code.
    pub fn set_reject(&self, error_code: impl Into<String>) {
        self.state.write().unwrap().reject_with = Some(error_code.into());
    }

    /// Configures the validator to fail as a collaborator.
    pub fn set_fail_on_validate(&self, fail: bool) {
        self.state.write().unwrap().fail_on_validate = fail;
    }

    /// Returns the number of validation requests received.
    pub fn validation_count(&self) -> usize {
        self.state.read().unwrap().seen_traces.len()
    }

    /// Returns the trace headers of every request envelope received.
    pub fn recorded_traces(&self) -> Vec<TraceHeader> {
        self.state.read().unwrap().seen_traces.clone()
    }
}

#[async_trait]
impl Validator for InMemoryValidator {
    async fn validate(
        &self,
        envelope: Envelope<ValidateMessage>,
    ) -> Result<Envelope<ValidationOutcome>, SagaError> {
        let outcome = {
            let mut state = self.state.write().unwrap();
            state.seen_traces.push(envelope.trace.clone());

            if state.fail_on_validate {
                return Err(SagaError::ValidationService(
                    "validation service unavailable".to_string(),
                ));
            }

            match &state.reject_with {
                Some(code) => ValidationOutcome::invalid(code.clone()),
                None => ValidationOutcome::valid(),
            }
        };

        Ok(envelope.next(
            event_types::VALIDATION_RESULT_DOC,
            layers::DC,
            "ChatValidationService",
            outcome,
        ))
    }
}
