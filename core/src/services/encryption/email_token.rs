//! Stateless email verification tokens sealed with AES-256-GCM
//!
//! A token is `base64(nonce || ciphertext)` where the ciphertext is the
//! AES-GCM encryption of the bincode-encoded [`EmailVerificationClaims`].
//! Nothing is stored server side; the authentication tag is what makes a
//! token unforgeable.

use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Duration;
use eau_shared::validation::validate_email_address;
use eau_shared::{EmailTokenConfig, MAX_EMAIL_TOKEN_LIFE_HOURS};
use rand::{rngs::OsRng, RngCore};

use crate::domain::entities::EmailVerificationClaims;
use crate::errors::{DomainError, DomainResult, EmailTokenError, KeyError, ValidationError};
use crate::services::clock::{Clock, SystemClock};

use super::key_manager::SymmetricKeyProvider;

/// AES-GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Configuration for the email verification token service
#[derive(Debug, Clone)]
pub struct EmailTokenServiceConfig {
    /// Token lifetime in hours
    pub token_life_hours: i64,
    /// Reject syntactically invalid addresses before issuing
    ///
    /// Off by default: any string round-trips, and address checks belong to
    /// callers that want them.
    pub validate_address: bool,
}

impl Default for EmailTokenServiceConfig {
    fn default() -> Self {
        Self::from(&EmailTokenConfig::default())
    }
}

impl From<&EmailTokenConfig> for EmailTokenServiceConfig {
    fn from(config: &EmailTokenConfig) -> Self {
        Self {
            token_life_hours: config.token_life_hours,
            validate_address: false,
        }
    }
}

impl EmailTokenServiceConfig {
    /// Lifetime in `1..=MAX_EMAIL_TOKEN_LIFE_HOURS` hours
    pub fn token_life(&self) -> Result<Duration, ValidationError> {
        let invalid = || ValidationError::InvalidLifetime {
            field: "token_life_hours".to_string(),
            value: self.token_life_hours,
        };

        if !(1..=MAX_EMAIL_TOKEN_LIFE_HOURS).contains(&self.token_life_hours) {
            return Err(invalid());
        }
        Duration::try_hours(self.token_life_hours).ok_or_else(invalid)
    }
}

/// Issues and verifies email ownership tokens
pub struct EmailVerificationTokenService {
    key_provider: Arc<SymmetricKeyProvider>,
    config: EmailTokenServiceConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EmailVerificationTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailVerificationTokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EmailVerificationTokenService {
    pub fn new(key_provider: Arc<SymmetricKeyProvider>, config: EmailTokenServiceConfig) -> Self {
        Self::with_clock(key_provider, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        key_provider: Arc<SymmetricKeyProvider>,
        config: EmailTokenServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key_provider,
            config,
            clock,
        }
    }

    /// Issues a token proving ownership of `email`
    ///
    /// # Arguments
    ///
    /// * `email` - Embedded verbatim and returned unchanged by `verify_token`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Base64 token
    /// * `Err(DomainError)` - Invalid lifetime, rejected address (only with
    ///   `validate_address`), or the encryption key is unavailable
    pub fn create_token(&self, email: &str) -> DomainResult<String> {
        if self.config.validate_address {
            validate_email_address(email).map_err(ValidationError::from)?;
        }

        let lifetime = self.config.token_life()?;
        let claims = EmailVerificationClaims::new(email, self.clock.now(), lifetime).ok_or_else(|| {
            ValidationError::InvalidLifetime {
                field: "token_life_hours".to_string(),
                value: self.config.token_life_hours,
            }
        })?;
        let plaintext = bincode::serialize(&claims).map_err(|e| DomainError::Internal {
            message: format!("Failed to encode email token claims: {}", e),
        })?;

        let nonce = Self::generate_nonce()?;
        let cipher = Aes256Gcm::new(self.key_provider.key()?.cipher_key());
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|e| DomainError::Internal {
                message: format!("Encryption failed: {}", e),
            })?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        tracing::debug!(
            event = "email_token_issued",
            expires_at = %claims.expires_at,
            "Issued email verification token"
        );

        Ok(BASE64.encode(sealed))
    }

    /// Verifies a token and returns the address it was issued for
    ///
    /// Tokens are not consumed; the same token verifies until it expires.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The embedded address
    /// * `Err(DomainError::EmailToken(Malformed))` - Undecodable, truncated or tampered
    /// * `Err(DomainError::EmailToken(Expired))` - Past its expiry
    pub fn verify_token(&self, token: &str) -> DomainResult<String> {
        let sealed = BASE64
            .decode(token.trim())
            .map_err(|e| malformed(format!("invalid base64: {}", e)))?;

        if sealed.len() < NONCE_LEN {
            return Err(malformed("token too short"));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(self.key_provider.key()?.cipher_key());
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| malformed("decryption failed"))?;

        let claims: EmailVerificationClaims = bincode::deserialize(&plaintext)
            .map_err(|e| malformed(format!("invalid payload: {}", e)))?;

        if claims.is_expired_at(self.clock.now()) {
            tracing::debug!(
                event = "email_token_rejected",
                reason = "expired",
                expires_at = %claims.expires_at,
                "Rejected email verification token"
            );
            return Err(EmailTokenError::Expired.into());
        }

        Ok(claims.email)
    }

    fn generate_nonce() -> Result<[u8; NONCE_LEN], KeyError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| KeyError::Generation {
                message: format!("Failed to generate nonce: {}", e),
            })?;
        Ok(nonce)
    }
}

fn malformed(reason: impl Into<String>) -> DomainError {
    let reason = reason.into();
    tracing::debug!(
        event = "email_token_rejected",
        reason = %reason,
        "Rejected email verification token"
    );
    EmailTokenError::Malformed { reason }.into()
}
