//! The generic envelope wrapper and its two sanctioned constructors.

use serde::{Deserialize, Serialize};

use common::CorrelationId;

use crate::header::{CausationId, EventId, GovernanceHeader, ProtocolHeader, Source, TraceHeader};

/// An immutable message wrapper carrying a typed payload alongside
/// protocol, trace, and governance metadata.
///
/// Envelopes are only ever built through [`Envelope::new_root`] (once per
/// saga) or [`Envelope::next`] (every subsequent hop), which keeps the
/// causal chain well-formed by construction: every non-root envelope's
/// causation id equals a prior envelope's event id, and the correlation id
/// never changes within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub protocol: ProtocolHeader,
    pub trace: TraceHeader,
    pub governance: GovernanceHeader,
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Creates the root envelope of a new causal chain.
    ///
    /// Generates a fresh correlation id and sets the causation id to the
    /// root sentinel. The actor identity is recorded in the governance
    /// header and travels unchanged through every downstream envelope.
    pub fn new_root(
        event_type: impl Into<String>,
        source_layer: impl Into<String>,
        source_service: impl Into<String>,
        actor_id: impl Into<String>,
        payload: T,
    ) -> Self {
        Self {
            protocol: ProtocolHeader::new(event_type),
            trace: TraceHeader {
                correlation_id: CorrelationId::new(),
                causation_id: CausationId::Root,
                source: Source::new(source_layer, source_service),
            },
            governance: GovernanceHeader::for_actor(actor_id),
            payload,
        }
    }

    /// Creates the next envelope in an existing causal chain.
    ///
    /// Copies the correlation id and governance header from `self`, records
    /// this envelope's event id as the new envelope's causation id, and
    /// stamps the new source.
    pub fn next<U>(
        &self,
        event_type: impl Into<String>,
        source_layer: impl Into<String>,
        source_service: impl Into<String>,
        payload: U,
    ) -> Envelope<U> {
        Envelope {
            protocol: ProtocolHeader::new(event_type),
            trace: TraceHeader {
                correlation_id: self.trace.correlation_id,
                causation_id: CausationId::Event(self.protocol.event_id),
                source: Source::new(source_layer, source_service),
            },
            governance: self.governance.clone(),
            payload,
        }
    }

    /// Returns the correlation id shared by the whole saga run.
    pub fn correlation_id(&self) -> CorrelationId {
        self.trace.correlation_id
    }

    /// Returns this envelope's unique event id.
    pub fn event_id(&self) -> EventId {
        self.protocol.event_id
    }

    /// Returns the actor on whose behalf this envelope was produced.
    pub fn actor_id(&self) -> &str {
        &self.governance.security_context.actor_id
    }
}
