//! Email verification token payload.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default email verification token lifetime (12 hours)
pub const EMAIL_TOKEN_EXPIRY_HOURS: i64 = 12;

/// Plaintext sealed inside an email verification token
///
/// Carries no identifier: a token stays valid for repeated use until
/// `expires_at`, which is fine because the action it authorizes (marking an
/// address verified) is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerificationClaims {
    /// Address whose ownership is being proven
    pub email: String,

    /// Instant after which the token is rejected
    pub expires_at: DateTime<Utc>,
}

impl EmailVerificationClaims {
    /// Claims expiring `lifetime` after `issued_at`
    ///
    /// `None` when the expiry instant cannot be represented.
    pub fn new(email: impl Into<String>, issued_at: DateTime<Utc>, lifetime: Duration) -> Option<Self> {
        Some(Self {
            email: email.into(),
            expires_at: issued_at.checked_add_signed(lifetime)?,
        })
    }

    /// Expired strictly after `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
