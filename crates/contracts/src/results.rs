//! The terminal result union returned to the caller of a saga.

use serde::{Deserialize, Serialize};

use common::CorrelationId;

/// Status string carried by successful results.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Status string carried by every failure result.
pub const STATUS_ERROR: &str = "ERROR";

/// Error code for commands rejected by validation.
pub const ERROR_CODE_VALIDATION_FAILED: &str = "VALIDATION_FAILED";

/// Error code for debits refused by the asset service.
pub const ERROR_CODE_INSUFFICIENT_ASSET: &str = "INSUFFICIENT_ASSET";

/// Exactly one of these is produced per `execute` call, mirroring the four
/// terminal states of the saga.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SendMessageResult {
    /// The message was recorded and the asset debited.
    Completed(CompletedData),

    /// The command failed validation; nothing was persisted or debited.
    ValidationFailed(ValidationFailedData),

    /// The asset service refused the debit.
    InsufficientAsset(InsufficientAssetData),

    /// The saga failed for a reason the caller cannot act on.
    InternalError(InternalErrorData),
}

/// Data for a completed result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedData {
    pub status: String,
    pub trace_id: CorrelationId,
}

/// Data for a validation-failed result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailedData {
    pub status: String,
    pub error_code: String,
    pub trace_id: CorrelationId,
}

/// Data for an insufficient-asset result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsufficientAssetData {
    pub status: String,
    pub error_code: String,
    pub trace_id: CorrelationId,
}

/// Data for an internal-error result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalErrorData {
    pub status: String,
    pub message: String,
    pub trace_id: CorrelationId,
}

impl SendMessageResult {
    /// Creates a completed result.
    pub fn completed(trace_id: CorrelationId) -> Self {
        SendMessageResult::Completed(CompletedData {
            status: STATUS_SUCCESS.to_string(),
            trace_id,
        })
    }

    /// Creates a validation-failed result.
    pub fn validation_failed(trace_id: CorrelationId) -> Self {
        SendMessageResult::ValidationFailed(ValidationFailedData {
            status: STATUS_ERROR.to_string(),
            error_code: ERROR_CODE_VALIDATION_FAILED.to_string(),
            trace_id,
        })
    }

    /// Creates an insufficient-asset result.
    pub fn insufficient_asset(trace_id: CorrelationId) -> Self {
        SendMessageResult::InsufficientAsset(InsufficientAssetData {
            status: STATUS_ERROR.to_string(),
            error_code: ERROR_CODE_INSUFFICIENT_ASSET.to_string(),
            trace_id,
        })
    }

    /// Creates an internal-error result carrying the failure description.
    pub fn internal_error(trace_id: CorrelationId, message: impl Into<String>) -> Self {
        SendMessageResult::InternalError(InternalErrorData {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
            trace_id,
        })
    }

    /// Returns the status string (`"SUCCESS"` or `"ERROR"`).
    pub fn status(&self) -> &str {
        match self {
            SendMessageResult::Completed(data) => &data.status,
            SendMessageResult::ValidationFailed(data) => &data.status,
            SendMessageResult::InsufficientAsset(data) => &data.status,
            SendMessageResult::InternalError(data) => &data.status,
        }
    }

    /// Returns the correlation id of the saga that produced this result.
    pub fn trace_id(&self) -> CorrelationId {
        match self {
            SendMessageResult::Completed(data) => data.trace_id,
            SendMessageResult::ValidationFailed(data) => data.trace_id,
            SendMessageResult::InsufficientAsset(data) => data.trace_id,
            SendMessageResult::InternalError(data) => data.trace_id,
        }
    }

    /// Returns the machine-readable error code, if any.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            SendMessageResult::ValidationFailed(data) => Some(&data.error_code),
            SendMessageResult::InsufficientAsset(data) => Some(&data.error_code),
            _ => None,
        }
    }

    /// Returns true for a completed result.
    pub fn is_success(&self) -> bool {
        self.status() == STATUS_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_has_success_status() {
        let trace = CorrelationId::new();
        let result = SendMessageResult::completed(trace);

        assert!(result.is_success());
        assert_eq!(result.status(), STATUS_SUCCESS);
        assert_eq!(result.trace_id(), trace);
        assert!(result.error_code().is_none());
    }

    #[test]
    fn validation_failed_carries_error_code() {
        let result = SendMessageResult::validation_failed(CorrelationId::new());

        assert!(!result.is_success());
        assert_eq!(result.error_code(), Some(ERROR_CODE_VALIDATION_FAILED));
    }

    #[test]
    fn insufficient_asset_carries_error_code() {
        let result = SendMessageResult::insufficient_asset(CorrelationId::new());

        assert!(!result.is_success());
        assert_eq!(result.error_code(), Some(ERROR_CODE_INSUFFICIENT_ASSET));
    }

    #[test]
    fn internal_error_carries_message() {
        let result = SendMessageResult::internal_error(CorrelationId::new(), "boom");

        assert!(!result.is_success());
        if let SendMessageResult::InternalError(data) = &result {
            assert_eq!(data.message, "boom");
        } else {
            panic!("Expected InternalError variant");
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let results = vec![
            SendMessageResult::completed(CorrelationId::new()),
            SendMessageResult::validation_failed(CorrelationId::new()),
            SendMessageResult::insufficient_asset(CorrelationId::new()),
            SendMessageResult::internal_error(CorrelationId::new(), "fault"),
        ];

        for result in results {
            let json = serde_json::to_string(&result).unwrap();
            let back: SendMessageResult = serde_json::from_str(&json).unwrap();
            assert_eq!(back.status(), result.status());
            assert_eq!(back.trace_id(), result.trace_id());
        }
    }
}
