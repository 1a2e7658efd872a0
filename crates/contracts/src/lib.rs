//! Versioned message contracts exchanged between the saga core and its
//! collaborators: the inbound command, the per-step request payloads, the
//! collaborator response documents, and the terminal result union.

pub mod commands;
pub mod docs;
pub mod event_types;
pub mod results;

pub use commands::{ConsumeAsset, SaveChatMessage, SendMessageCommand, ValidateMessage};
pub use docs::{AssetConsumed, StoredMessage, ValidationOutcome};
pub use results::{SendMessageResult, STATUS_ERROR, STATUS_SUCCESS};
