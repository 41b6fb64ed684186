//! # Eau Core
//!
//! Credential core for the Eau backend.
//! This crate contains the session token protocol (signed refresh and access
//! tokens), stateless email verification tokens, custody of the key material
//! behind both, and the error types shared by them.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    ClaimMap, EmailVerificationClaims, KeyPair, SessionClaims, TokenType,
};
pub use errors::*;
pub use services::*;
