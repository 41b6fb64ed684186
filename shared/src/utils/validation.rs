//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Maximum length of an address accepted by SMTP (RFC 5321)
pub const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

/// Validation error with field-level details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Parse an address in either `user@host` or `Display Name <user@host>` form
///
/// Returns the bare address on success.
pub fn validate_email_address(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let address = match (trimmed.rfind('<'), trimmed.ends_with('>')) {
        (Some(start), true) => &trimmed[start + 1..trimmed.len() - 1],
        (None, false) => trimmed,
        _ => {
            return Err(ValidationError::new(
                "email",
                "unbalanced angle brackets in address",
                "INVALID_EMAIL",
            ))
        }
    };

    if address.is_empty() {
        return Err(ValidationError::new("email", "no address", "INVALID_EMAIL"));
    }
    if address.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::new(
            "email",
            format!("address longer than {} characters", MAX_EMAIL_LENGTH),
            "INVALID_EMAIL",
        ));
    }
    if !validators::is_valid_email(address) {
        return Err(ValidationError::new(
            "email",
            format!("invalid address: {}", address),
            "INVALID_EMAIL",
        ));
    }

    Ok(address.to_string())
}

/// Common validation functions
pub mod validators {
    use super::EMAIL_PATTERN;

    /// Check if an email address is syntactically valid
    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_PATTERN.is_match(email)
    }
}
