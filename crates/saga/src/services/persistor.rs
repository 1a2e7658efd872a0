//! Persistence collaborator trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use contracts::event_types::{self, layers};
use contracts::{SaveChatMessage, StoredMessage};
use envelope::{Envelope, TraceHeader};

use crate::error::SagaError;

/// Trait for the message-persistence collaborator.
///
/// A persistence failure is always an `Err`. This step has no domain
/// outcome of its own, so the saga folds any failure here into an
/// internal error rather than a resource failure.
#[async_trait]
pub trait MessagePersistor: Send + Sync {
    /// Durably stores a message record, returning its reference.
    async fn save(
        &self,
        envelope: Envelope<SaveChatMessage>,
    ) -> Result<Envelope<StoredMessage>, SagaError>;
}

#[derive(Debug, Default)]
struct InMemoryMessageStoreState {
    messages: HashMap<String, SaveChatMessage>,
    next_id: u32,
    fail_on_save: bool,
    seen_traces: Vec<TraceHeader>,
}

/// In-memory message store for testing and local wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    state: Arc<RwLock<InMemoryMessageStoreState>>,
}

impl InMemoryMessageStore {
    /// Creates a new in-memory message store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail on the next save call.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.state.write().unwrap().fail_on_save = fail;
    }

    /// Returns the number of stored messages.
    pub fn message_count(&self) -> usize {
        self.state.read().unwrap().messages.len()
    }

    /// Returns true if a message exists with the given reference.
    pub fn has_message(&self, stored_reference: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .messages
            .contains_key(stored_reference)
    }

    /// Returns the trace headers of every request envelope received.
    pub fn recorded_traces(&self) -> Vec<TraceHeader> {
        self.state.read().unwrap().seen_traces.clone()
    }
}

#[async_trait]
impl MessagePersistor for InMemoryMessageStore {
    async fn save(
        &self,
        envelope: Envelope<SaveChatMessage>,
    ) -> Result<Envelope<StoredMessage>, SagaError> {
        let stored_reference = {
            let mut state = self.state.write().unwrap();
            state.seen_traces.push(envelope.trace.clone());

            if state.fail_on_save {
                return Err(SagaError::PersistenceService(
                    "message store write failed".to_string(),
                ));
            }

            state.next_id += 1;
            let stored_reference = format!("MSG-{:04}", state.next_id);
            state
                .messages
                .insert(stored_reference.clone(), envelope.payload.clone());
            stored_reference
        };

        Ok(envelope.next(
            event_types::PERSISTENCE_RESULT_DOC,
            layers::DA0,
            "StateCoordinatorService",
            StoredMessage { stored_reference },
        ))
    }
}
