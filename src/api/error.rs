//! Backend Error Types
//!
//! Classifies every way a backend call can fail so the view models can map
//! failures onto user-facing messages without inspecting transport details.

use thiserror::Error;

/// Message shown for connectivity failures
pub const UNREACHABLE_MESSAGE: &str = "Cannot reach the server";

/// Errors returned by [`super::AttendanceApi`] implementations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request never completed (connection refused, DNS, reset)
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("Backend rejected request ({status}): {}", message.as_deref().unwrap_or("no details"))]
    Rejected {
        status: u16,
        /// The body's `error` (or `message`) field, when present
        message: Option<String>,
    },

    /// Backend answered successfully but the body could not be decoded
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ApiError {
    /// True for failures where no response was received
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Unreachable(_) | ApiError::Timeout)
    }

    /// Status code of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text to show the user.
    ///
    /// Backend-supplied messages are passed through verbatim. Network failures
    /// get the generic connectivity message, anything else the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Unreachable(_) | ApiError::Timeout => UNREACHABLE_MESSAGE.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::Client(err.to_string())
        } else {
            ApiError::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_passes_through() {
        let err = ApiError::Rejected {
            status: 409,
            message: Some("Member with this email already exists".to_string()),
        };
        assert_eq!(
            err.user_message("Error adding member"),
            "Member with this email already exists"
        );
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_rejection_without_message_uses_fallback() {
        let err = ApiError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("Failed to fetch members"), "Failed to fetch members");

        let blank = ApiError::Rejected {
            status: 400,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_network_failures_share_one_message() {
        assert!(ApiError::Timeout.is_network());
        assert_eq!(ApiError::Timeout.user_message("x"), UNREACHABLE_MESSAGE);
        assert_eq!(
            ApiError::Unreachable("connection refused".into()).user_message("x"),
            UNREACHABLE_MESSAGE
        );
        assert!(!ApiError::Decode("eof".into()).is_network());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Rejected {
            status: 404,
            message: None,
        };
        assert_eq!(err.to_string(), "Backend rejected request (404): no details");
    }
}
