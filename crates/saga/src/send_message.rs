//! Send-message saga constants.

/// The saga type identifier for sending a message.
pub const SAGA_TYPE: &str = "SendMessage";

/// Step name: validate the inbound command.
pub const STEP_VALIDATE: &str = "validate";

/// Step name: persist the message, then debit the asset balance.
pub const STEP_PERSIST_AND_DEBIT: &str = "persist_and_debit";
