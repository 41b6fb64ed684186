//! Domain-specific error types for credential operations
//!
//! Four failure categories reach callers: invalid session tokens, malformed
//! email tokens, expired email tokens and unavailable key material. Each is
//! a typed variant; none of them is retried inside the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Session token errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, badly signed, expired or wrong-kind session token
    #[error("Invalid token: {message}")]
    InvalidToken { token: String, message: String },

    #[error("Token generation failed: {message}")]
    TokenGenerationFailed { message: String },

    #[error("Invalid authorization header: {message}")]
    InvalidAuthorizationHeader { message: String },
}

impl TokenError {
    /// Build an invalid-token error carrying the offending token string
    pub fn invalid(token: impl Into<String>, message: impl Into<String>) -> Self {
        TokenError::InvalidToken {
            token: token.into(),
            message: message.into(),
        }
    }

    /// The rejected token, when the error is about a specific token
    pub fn token(&self) -> Option<&str> {
        match self {
            TokenError::InvalidToken { token, .. } => Some(token),
            _ => None,
        }
    }
}

/// Email verification token errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailTokenError {
    /// Undecodable, truncated or tampered token
    #[error("Malformed email verification token: {reason}")]
    Malformed { reason: String },

    #[error("Email verification token expired")]
    Expired,
}

/// Key material could not be produced or loaded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key generation failed: {message}")]
    Generation { message: String },

    #[error("Key encoding failed: {message}")]
    Encoding { message: String },

    #[error("Malformed key material at {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("Key storage failure at {path}: {message}")]
    Storage { path: String, message: String },

    #[error("Key storage request for {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },
}

impl KeyError {
    /// Whether retrying the same call later may succeed
    ///
    /// Generation and storage hiccups are transient; malformed stored
    /// material needs an operator.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            KeyError::Generation { .. } | KeyError::Storage { .. } | KeyError::Timeout { .. }
        )
    }
}

/// Failures reported by a durable object store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectStoreError {
    #[error("Object not found: {path}")]
    NotFound { path: String },

    #[error("Object store failure at {path}: {message}")]
    Backend { path: String, message: String },
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email address: {reason}")]
    InvalidEmail { reason: String },

    #[error("Invalid length for field: {field} (expected: {expected}, actual: {actual})")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Lifetime that is not positive or too large to represent
    #[error("Invalid lifetime for {field}: {value}")]
    InvalidLifetime { field: String, value: i64 },
}

impl From<eau_shared::validation::ValidationError> for ValidationError {
    fn from(err: eau_shared::validation::ValidationError) -> Self {
        ValidationError::InvalidEmail {
            reason: err.message,
        }
    }
}

/// Unified error response structure for the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl From<TokenError> for ErrorResponse {
    fn from(err: TokenError) -> Self {
        let error_code = match &err {
            TokenError::InvalidToken { .. } => "INVALID_TOKEN",
            TokenError::TokenGenerationFailed { .. } => "TOKEN_GENERATION_FAILED",
            TokenError::InvalidAuthorizationHeader { .. } => "INVALID_AUTHORIZATION_HEADER",
        };

        ErrorResponse::new(error_code, err.to_string())
    }
}

impl From<EmailTokenError> for ErrorResponse {
    fn from(err: EmailTokenError) -> Self {
        let error_code = match &err {
            EmailTokenError::Malformed { .. } => "MALFORMED_EMAIL_TOKEN",
            EmailTokenError::Expired => "EXPIRED_EMAIL_TOKEN",
        };

        ErrorResponse::new(error_code, err.to_string())
    }
}

impl From<KeyError> for ErrorResponse {
    fn from(err: KeyError) -> Self {
        // Storage paths and parser details stay in the logs
        tracing::error!(error = %err, event = "key_unavailable", "Key material unavailable");
        ErrorResponse::new("KEY_UNAVAILABLE", "Signing keys are temporarily unavailable")
    }
}

impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        let error_code = match &err {
            ValidationError::InvalidEmail { .. } => "INVALID_EMAIL",
            ValidationError::InvalidLength { .. } => "INVALID_LENGTH",
            ValidationError::InvalidLifetime { .. } => "INVALID_LIFETIME",
        };

        ErrorResponse::new(error_code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_token_message() {
        let error = TokenError::invalid("abc.def.ghi", "Invalid token type.");
        assert_eq!(error.to_string(), "Invalid token: Invalid token type.");
        assert_eq!(error.token(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_token_error_conversion() {
        let response: ErrorResponse = TokenError::invalid("t", "ExpiredSignature").into();
        assert_eq!(response.error, "INVALID_TOKEN");
        assert!(response.message.contains("ExpiredSignature"));
    }

    #[test]
    fn test_email_token_error_conversion() {
        let response: ErrorResponse = EmailTokenError::Expired.into();
        assert_eq!(response.error, "EXPIRED_EMAIL_TOKEN");

        let response: ErrorResponse = EmailTokenError::Malformed {
            reason: "token too short".to_string(),
        }
        .into();
        assert_eq!(response.error, "MALFORMED_EMAIL_TOKEN");
        assert!(response.message.contains("token too short"));
    }

    #[test]
    fn test_key_error_response_hides_details() {
        let response: ErrorResponse = KeyError::Malformed {
            path: "jwt/signing_key.pem".to_string(),
            message: "bad base64".to_string(),
        }
        .into();
        assert_eq!(response.error, "KEY_UNAVAILABLE");
        assert!(!response.message.contains("signing_key.pem"));
    }

    #[test]
    fn test_invalid_lifetime_conversion() {
        let response: ErrorResponse = ValidationError::InvalidLifetime {
            field: "refresh_token_life_minutes".to_string(),
            value: -5,
        }
        .into();
        assert_eq!(response.error, "INVALID_LIFETIME");
        assert!(response.message.contains("refresh_token_life_minutes"));
    }

    #[test]
    fn test_key_error_transience() {
        assert!(KeyError::Timeout {
            path: "p".to_string(),
            timeout: Duration::from_secs(1),
        }
        .is_transient());
        assert!(!KeyError::Malformed {
            path: "p".to_string(),
            message: "m".to_string(),
        }
        .is_transient());
    }
}
