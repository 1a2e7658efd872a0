//! Asset-debit collaborator trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use contracts::event_types::{self, layers};
use contracts::results::ERROR_CODE_INSUFFICIENT_ASSET;
use contracts::{AssetConsumed, ConsumeAsset};
use envelope::{Envelope, TraceHeader};

use crate::error::SagaError;

/// Trait for the external asset-debit collaborator.
#[async_trait]
pub trait AssetDebiter: Send + Sync {
    /// Debits the requested amount from the user's asset balance.
    ///
    /// An insufficient balance is an `Ok` envelope with
    /// `is_success == false`; an `Err` means the collaborator itself
    /// failed.
    async fn consume(
        &self,
        envelope: Envelope<ConsumeAsset>,
    ) -> Result<Envelope<AssetConsumed>, SagaError>;
}

#[derive(Debug, Default)]
struct InMemoryAssetDebiterState {
    debits: HashMap<String, ConsumeAsset>,
    next_id: u32,
    insufficient: bool,
    fail_on_consume: bool,
    hang_on_consume: bool,
    seen_traces: Vec<TraceHeader>,
}

/// In-memory asset debiter for testing and local wiring.
///
/// Grants every debit by default. `set_insufficient` makes it refuse with
/// the insufficient-asset code, `set_fail_on_consume` makes the
/// collaborator fail, and `set_hang_on_consume` makes it never return
/// (the knob the timeout tests use).
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetDebiter {
    state: Arc<RwLock<InMemoryAssetDebiterState>>,
}

impl InMemoryAssetDebiter {
    /// Creates a new in-memory asset debiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the debiter to refuse debits for lack of balance.
    pub fn set_insufficient(&self, insufficient: bool) {
        self.state.write().unwrap().insufficient = insufficient;
    }

    /// Configures the debiter to fail as a collaborator.
    pub fn set_fail_on_consume(&self, fail: bool) {
        self.state.write().unwrap().fail_on_consume = fail;
    }

    /// Configures the debiter to never return from consume.
    pub fn set_hang_on_consume(&self, hang: bool) {
        self.state.write().unwrap().hang_on_consume = hang;
    }

    /// Returns the number of applied debits.
    pub fn debit_count(&self) -> usize {
        self.state.read().unwrap().debits.len()
    }

    /// Returns the trace headers of every request envelope received.
    pub fn recorded_traces(&self) -> Vec<TraceHeader> {
        self.state.read().unwrap().seen_traces.clone()
    }
}

#[async_trait]
impl AssetDebiter for InMemoryAssetDebiter {
    async fn consume(
        &self,
        envelope: Envelope<ConsumeAsset>,
    ) -> Result<Envelope<AssetConsumed>, SagaError> {
        let outcome = {
            let mut state = self.state.write().unwrap();
            state.seen_traces.push(envelope.trace.clone());

            if state.fail_on_consume {
                return Err(SagaError::AssetService(
                    "asset service unreachable".to_string(),
                ));
            }

            if state.hang_on_consume {
                None
            } else if state.insufficient {
                Some(AssetConsumed::refused(ERROR_CODE_INSUFFICIENT_ASSET))
            } else {
                state.next_id += 1;
                let debit_id = format!("DEBIT-{:04}", state.next_id);
                state.debits.insert(debit_id, envelope.payload.clone());
                Some(AssetConsumed::success())
            }
        };

        let Some(outcome) = outcome else {
            // Lock released above; park this call forever.
            std::future::pending::<()>().await;
            unreachable!("pending future resolved");
        };

        Ok(envelope.next(
            event_types::ASSET_CONSUMED_EVT,
            layers::DA_EXT,
            "AssetService",
            outcome,
        ))
    }
}
