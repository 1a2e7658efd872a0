//! Envelope header types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use common::CorrelationId;

/// Unique identifier for an event envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EventId> for Uuid {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// Identifier of the envelope that caused the current one to be produced.
///
/// The first envelope of a saga has no predecessor and carries the `Root`
/// sentinel, which serializes as the string `"root"`. Every other envelope
/// carries the event id of its direct predecessor, so the causation ids of
/// a saga run form a chain terminating at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CausationId {
    /// This envelope is the start of a causal chain.
    Root,
    /// This envelope was caused by the envelope with the given event id.
    Event(EventId),
}

impl CausationId {
    /// Returns true if this is the root sentinel.
    pub fn is_root(&self) -> bool {
        matches!(self, CausationId::Root)
    }

    /// Returns the causing event id, if any.
    pub fn as_event(&self) -> Option<EventId> {
        match self {
            CausationId::Root => None,
            CausationId::Event(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for CausationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CausationId::Root => write!(f, "root"),
            CausationId::Event(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for CausationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CausationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "root" {
            return Ok(CausationId::Root);
        }
        let uuid = Uuid::parse_str(&raw).map_err(serde::de::Error::custom)?;
        Ok(CausationId::Event(EventId::from_uuid(uuid)))
    }
}

/// Protocol header — routing, parsing, and versioning metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolHeader {
    /// Unique identifier for this envelope.
    pub event_id: EventId,

    /// Namespaced event type tag (e.g. `"DSV.L2.CMD.SendMessage.v1"`).
    pub event_type: String,

    /// Optional URL of the schema describing the payload.
    pub schema_url: Option<String>,

    /// When the envelope was created.
    pub timestamp: DateTime<Utc>,
}

impl ProtocolHeader {
    /// Creates a protocol header with a fresh event id and timestamp.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_id: EventId::new(),
            event_type: event_type.into(),
            schema_url: None,
            timestamp: Utc::now(),
        }
    }
}

/// The component that produced an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Architectural layer (e.g. `"APP"`, `"DA"`, `"DC"`).
    pub layer: String,
    /// Service name within the layer.
    pub service: String,
}

impl Source {
    /// Creates a source descriptor.
    pub fn new(layer: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            service: service.into(),
        }
    }
}

/// Trace header — business-flow and causal-chain tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Identifier shared by every envelope of one saga run.
    pub correlation_id: CorrelationId,

    /// Event id of the envelope that produced this one, or the root sentinel.
    pub causation_id: CausationId,

    /// The component that produced this envelope.
    pub source: Source,
}

/// Distributed-tracing context propagated alongside business metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
}

/// Runtime placement context for the producing process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeContext {
    pub pod_name: Option<String>,
    pub node_name: Option<String>,
    pub namespace: Option<String>,
}

/// Security context identifying the actor on whose behalf work happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityContext {
    pub actor_id: String,
    pub tenant_id: Option<String>,
}

/// Governance header — security, tracing, and tagging metadata.
///
/// Copied verbatim from envelope to envelope within one saga run, so the
/// actor identity established at the root is visible at every hop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceHeader {
    pub trace_context: Option<TraceContext>,
    pub runtime_context: Option<RuntimeContext>,
    pub security_context: SecurityContext,
    pub tags: Vec<String>,
}

impl GovernanceHeader {
    /// Creates a governance header for the given actor.
    pub fn for_actor(actor_id: impl Into<String>) -> Self {
        Self {
            trace_context: None,
            runtime_context: None,
            security_context: SecurityContext {
                actor_id: actor_id.into(),
                tenant_id: None,
            },
            tags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_new_creates_unique_ids() {
        let id1 = EventId::new();
        let id2 = EventId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn causation_root_serializes_as_sentinel() {
        let json = serde_json::to_string(&CausationId::Root).unwrap();
        assert_eq!(json, "\"root\"");

        let back: CausationId = serde_json::from_str(&json).unwrap();
        assert!(back.is_root());
    }

    #[test]
    fn causation_event_roundtrip() {
        let id = EventId::new();
        let causation = CausationId::Event(id);

        let json = serde_json::to_string(&causation).unwrap();
        let back: CausationId = serde_json::from_str(&json).unwrap();

        assert_eq!(back.as_event(), Some(id));
    }

    #[test]
    fn causation_rejects_malformed_ids() {
        let result = serde_json::from_str::<CausationId>("\"not-a-uuid\"");
        assert!(result.is_err());
    }

    #[test]
    fn protocol_header_generates_fresh_ids() {
        let h1 = ProtocolHeader::new("DSV.L2.CMD.SendMessage.v1");
        let h2 = ProtocolHeader::new("DSV.L2.CMD.SendMessage.v1");

        assert_ne!(h1.event_id, h2.event_id);
        assert_eq!(h1.event_type, h2.event_type);
        assert!(h1.schema_url.is_none());
    }

    #[test]
    fn governance_for_actor_sets_security_context() {
        let gov = GovernanceHeader::for_actor("user-42");
        assert_eq!(gov.security_context.actor_id, "user-42");
        assert!(gov.security_context.tenant_id.is_none());
        assert!(gov.tags.is_empty());
    }
}
