//! Command payloads carried by envelopes into the saga and its steps.

use serde::{Deserialize, Serialize};

use common::CorrelationId;

/// The inbound business command: a user sends a message to a character.
///
/// `message_content` is free-form JSON whose shape depends on
/// `message_type` (a text body, a gift reference, ...), and the saga core
/// never inspects it beyond passing it to the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageCommand {
    pub user_session_token: String,
    pub character_id: String,
    pub message_type: String,
    pub message_content: serde_json::Value,
    pub idempotency_key: String,
    pub trace_id: String,
}

/// Validation request handed to the validator collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateMessage {
    /// The content to validate.
    pub message_content: serde_json::Value,
    /// The full original command, for context-dependent rules.
    pub original: SendMessageCommand,
}

impl ValidateMessage {
    /// Builds a validation request from the original command.
    pub fn from_command(command: &SendMessageCommand) -> Self {
        Self {
            message_content: command.message_content.clone(),
            original: command.clone(),
        }
    }
}

/// Persistence request handed to the message store collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveChatMessage {
    /// The message record to store.
    pub message: SendMessageCommand,
}

impl SaveChatMessage {
    /// Builds a persistence request from the original command.
    pub fn from_command(command: &SendMessageCommand) -> Self {
        Self {
            message: command.clone(),
        }
    }
}

/// Debit request handed to the external asset service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumeAsset {
    pub user_id: String,
    pub asset_id: String,
    pub amount: u32,
    pub idempotency_key: String,
    pub trace_id: CorrelationId,
}

impl ConsumeAsset {
    /// Derives a debit request from the original command.
    ///
    /// The account is identified by the user's session token, the asset by
    /// the message type, and one unit is consumed per message. The
    /// command's idempotency key travels with the request so the asset
    /// service can deduplicate retried sagas.
    pub fn from_command(command: &SendMessageCommand, trace_id: CorrelationId) -> Self {
        Self {
            user_id: command.user_session_token.clone(),
            asset_id: command.message_type.clone(),
            amount: 1,
            idempotency_key: command.idempotency_key.clone(),
            trace_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> SendMessageCommand {
        SendMessageCommand {
            user_session_token: "sess-1".to_string(),
            character_id: "char-7".to_string(),
            message_type: "GIFT".to_string(),
            message_content: serde_json::json!({ "gift_id": "g001" }),
            idempotency_key: "idem-1".to_string(),
            trace_id: "trace-1".to_string(),
        }
    }

    #[test]
    fn validate_message_carries_content_and_original() {
        let cmd = command();
        let req = ValidateMessage::from_command(&cmd);

        assert_eq!(req.message_content, cmd.message_content);
        assert_eq!(req.original.idempotency_key, "idem-1");
    }

    #[test]
    fn consume_asset_derived_from_command() {
        let cmd = command();
        let correlation = CorrelationId::new();
        let req = ConsumeAsset::from_command(&cmd, correlation);

        assert_eq!(req.user_id, "sess-1");
        assert_eq!(req.asset_id, "GIFT");
        assert_eq!(req.amount, 1);
        assert_eq!(req.idempotency_key, "idem-1");
        assert_eq!(req.trace_id, correlation);
    }

    #[test]
    fn command_serialization_roundtrip() {
        let cmd = command();
        let json = serde_json::to_string(&cmd).unwrap();
        let back: SendMessageCommand = serde_json::from_str(&json).unwrap();

        assert_eq!(back.character_id, cmd.character_id);
        assert_eq!(back.message_content, cmd.message_content);
    }
}
