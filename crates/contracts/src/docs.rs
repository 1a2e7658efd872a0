//! Response documents returned by collaborators.

use serde::{Deserialize, Serialize};

/// Outcome of the validation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the command passed validation.
    pub is_valid: bool,
    /// Machine-readable reason when invalid (e.g. `"INVALID_CONTENT"`).
    pub error_code: Option<String>,
}

impl ValidationOutcome {
    /// A passing outcome.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_code: None,
        }
    }

    /// A failing outcome with the given reason code.
    pub fn invalid(error_code: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_code: Some(error_code.into()),
        }
    }
}

/// Outcome of the persistence step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Durable reference to the stored record.
    pub stored_reference: String,
}

/// Outcome of the asset-debit step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConsumed {
    /// Whether the debit was applied.
    pub is_success: bool,
    /// Machine-readable reason when refused (e.g. `"INSUFFICIENT_ASSET"`).
    pub error_code: Option<String>,
}

impl AssetConsumed {
    /// A successful debit.
    pub fn success() -> Self {
        Self {
            is_success: true,
            error_code: None,
        }
    }

    /// A refused debit with the given reason code.
    pub fn refused(error_code: impl Into<String>) -> Self {
        Self {
            is_success: false,
            error_code: Some(error_code.into()),
        }
    }
}
