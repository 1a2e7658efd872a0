//! Immutable message envelopes for the send-message saga.
//!
//! Every message exchanged between the orchestrator and its collaborators
//! travels inside an [`Envelope`]: a typed payload wrapped in protocol,
//! trace, and governance headers. Envelopes form a forward-only causal
//! chain. The root envelope of a saga carries the sentinel causation id
//! [`CausationId::Root`], and every downstream envelope is minted from its
//! predecessor via [`Envelope::next`], which copies the correlation id and
//! records the predecessor's event id as its causation id.

pub mod header;
pub mod message;

pub use header::{
    CausationId, EventId, GovernanceHeader, ProtocolHeader, RuntimeContext, SecurityContext,
    Source, TraceContext, TraceHeader,
};
pub use message::Envelope;
