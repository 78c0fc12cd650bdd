//! Standardized API response envelopes.

use serde::{Deserialize, Serialize};

/// Acknowledgement for operations without a resource to echo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Error body returned for every failure: `{"error": "..."}`.
///
/// The message is human readable and never carries internal details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new("Unauthorized")
    }

    pub fn invalid_credentials() -> Self {
        Self::new("Invalid credentials")
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(format!("{what} not found"))
    }

    pub fn internal_error() -> Self {
        Self::new("Internal server error")
    }
}
