//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{
    EmailTokenError, ErrorResponse, KeyError, ObjectStoreError, TokenError, ValidationError,
};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    EmailToken(#[from] EmailTokenError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Whether the caller may retry the same operation
    pub fn is_transient(&self) -> bool {
        match self {
            DomainError::Key(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Token(e) => e.into(),
            DomainError::EmailToken(e) => e.into(),
            DomainError::Key(e) => e.into(),
            DomainError::ValidationErr(e) => e.into(),
            DomainError::Internal { message } => {
                tracing::error!(error = %message, event = "internal_error", "Internal error");
                ErrorResponse::new("INTERNAL_ERROR", "Internal error")
            }
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
