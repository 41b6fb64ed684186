//! Session token issuance and verification

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Header, Validation};

use crate::domain::entities::token::{ClaimMap, SessionClaims, TokenType};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::services::clock::{Clock, SystemClock};

use super::bearer::extract_bearer_token;
use super::config::TokenServiceConfig;
use super::key_store::KeyStore;

/// Message reported when a token of the other kind is presented
pub const INVALID_TOKEN_TYPE: &str = "Invalid token type.";

/// Message reported when a token is past its `exp`
pub const TOKEN_EXPIRED: &str = "Token has expired.";

/// Issues and verifies signed refresh and access tokens
pub struct SessionTokenService {
    key_store: Arc<dyn KeyStore>,
    config: TokenServiceConfig,
    clock: Arc<dyn Clock>,
    validation: Validation,
}

impl std::fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionTokenService {
    /// Creates a session token service reading wall-clock time
    ///
    /// # Arguments
    ///
    /// * `key_store` - Source of the signing and verification keys
    /// * `config` - Token lifetimes and signing algorithm
    pub fn new(key_store: Arc<dyn KeyStore>, config: TokenServiceConfig) -> Self {
        Self::with_clock(key_store, config, Arc::new(SystemClock))
    }

    /// Creates a session token service with an explicit time source
    pub fn with_clock(
        key_store: Arc<dyn KeyStore>,
        config: TokenServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut validation = Validation::new(config.algorithm);
        // Expiry is judged against the injected clock in `decode_token`
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key_store,
            config,
            clock,
            validation,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issues a refresh token
    ///
    /// # Arguments
    ///
    /// * `claims` - Caller claims; read only, reserved keys are ignored
    ///
    /// # Returns
    ///
    /// * `Ok((String, SessionClaims))` - Signed token and the claims it carries
    /// * `Err(DomainError)` - Lifetime out of range, signing key unavailable
    ///   or signing failed
    pub async fn create_refresh_token(
        &self,
        claims: &ClaimMap,
    ) -> DomainResult<(String, SessionClaims)> {
        self.create_token(TokenType::Refresh, claims).await
    }

    /// Issues an access token
    pub async fn create_access_token(
        &self,
        claims: &ClaimMap,
    ) -> DomainResult<(String, SessionClaims)> {
        self.create_token(TokenType::Access, claims).await
    }

    /// Issues a token of the given kind
    pub async fn create_token(
        &self,
        token_type: TokenType,
        claims: &ClaimMap,
    ) -> DomainResult<(String, SessionClaims)> {
        let lifetime = match token_type {
            TokenType::Refresh => self.config.refresh_token_life()?,
            TokenType::Access => self.config.access_token_life()?,
        };
        let session_claims = SessionClaims::issue(claims, token_type, self.clock.now(), lifetime)?;

        let signing_key = self.key_store.signing_key().await?;
        let header = Header::new(self.config.algorithm);
        let token = encode(&header, &session_claims, signing_key.encoding_key()).map_err(|e| {
            DomainError::Token(TokenError::TokenGenerationFailed {
                message: e.to_string(),
            })
        })?;

        tracing::debug!(
            event = "session_token_issued",
            token_type = %token_type,
            jti = %session_claims.jti,
            exp = session_claims.exp,
            "Issued session token"
        );

        Ok((token, session_claims))
    }

    /// Verifies a token and returns its claims
    ///
    /// Signature, expiry and kind are checked in that order; every failure
    /// is reported as `TokenError::InvalidToken`.
    ///
    /// # Arguments
    ///
    /// * `token_type` - Kind the caller expects
    /// * `token` - Compact JWS string
    pub async fn decode_token(&self, token_type: TokenType, token: &str) -> DomainResult<SessionClaims> {
        let verification_key = self.key_store.verification_key().await?;

        let claims = decode::<SessionClaims>(token, verification_key.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let message = match e.kind() {
                    ErrorKind::ExpiredSignature => TOKEN_EXPIRED.to_string(),
                    _ => e.to_string(),
                };
                reject(token, token_type, message)
            })?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(reject(token, token_type, TOKEN_EXPIRED.to_string()));
        }

        if claims.token_type != token_type {
            return Err(reject(token, token_type, INVALID_TOKEN_TYPE.to_string()));
        }

        Ok(claims)
    }

    /// Verifies the access token carried by an `Authorization` header value
    pub async fn authenticate(&self, authorization: Option<&str>) -> DomainResult<SessionClaims> {
        let token = extract_bearer_token(authorization)?;
        self.decode_token(TokenType::Access, token).await
    }
}

fn reject(token: &str, expected: TokenType, message: String) -> DomainError {
    tracing::debug!(
        event = "session_token_rejected",
        expected = %expected,
        reason = %message,
        "Rejected session token"
    );
    DomainError::Token(TokenError::invalid(token, message))
}
