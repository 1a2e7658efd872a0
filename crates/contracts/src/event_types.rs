//! Namespaced event-type tags and source-layer names.
//!
//! Event types follow the `<namespace>.<level>.<kind>.<name>.<version>`
//! convention and identify the payload carried by an envelope.

/// Inbound send-message command (the saga's root envelope).
pub const SEND_MESSAGE_CMD: &str = "DSV.L2.CMD.SendMessage.v1";

/// Validation request sent to the validator collaborator.
pub const VALIDATE_MESSAGE_CMD: &str = "DSV.L2.CMD.ValidateMessage.v1";

/// Persistence request sent to the message store collaborator.
pub const SAVE_CHAT_MESSAGE_CMD: &str = "DSV.L2.CMD.SaveChatMessage.v1";

/// Debit request sent to the external asset service.
pub const CONSUME_ASSET_CMD: &str = "DSV.L2.CMD.ConsumeAsset.v1";

/// Validation outcome document returned by the validator.
pub const VALIDATION_RESULT_DOC: &str = "DSV.L2.DOC.ValidationResult.v1";

/// Persistence outcome document returned by the message store.
pub const PERSISTENCE_RESULT_DOC: &str = "DSV.L2.DOC.PersistenceResult.v1";

/// Debit outcome returned by the asset service.
pub const ASSET_CONSUMED_EVT: &str = "DSV.L2.EVT.AssetConsumed.v1";

/// Terminal result: the saga completed successfully.
pub const SEND_MESSAGE_COMPLETED_EVT: &str = "APP.L2.EVT.SendMessageCompleted.v1";

/// Terminal result: the command failed validation.
pub const VALIDATION_FAILED_EVT: &str = "APP.L2.EVT.ValidationFailed.v1";

/// Terminal result: the asset debit was refused.
pub const INSUFFICIENT_ASSET_EVT: &str = "APP.L2.EVT.InsufficientAsset.v1";

/// Terminal result: the saga failed internally.
pub const INTERNAL_SERVER_ERROR_EVT: &str = "APP.L2.EVT.InternalServerError.v1";

/// Source-layer names stamped into envelope trace headers.
pub mod layers {
    /// Application facade layer (orchestrator, HTTP adapter).
    pub const APP: &str = "APP";
    /// Domain agent layer (step handlers).
    pub const DA: &str = "DA";
    /// Domain computation layer (validation).
    pub const DC: &str = "DC";
    /// State coordination layer (persistence).
    pub const DA0: &str = "DA0";
    /// External collaborator layer (asset service).
    pub const DA_EXT: &str = "DA_EXT";
}
