//! Session token module
//!
//! This module handles everything around signed session tokens:
//! - Custody of the RSA signing key pair (in-memory or object-store backed)
//! - Refresh and access token issuance
//! - Token verification with expiry and kind checks
//! - Bearer credential extraction from `Authorization` headers

mod bearer;
mod config;
mod key_store;
mod object_store;
mod remote_key_store;
mod service;

#[cfg(test)]
mod tests;

pub use bearer::extract_bearer_token;
pub use config::TokenServiceConfig;
pub use key_store::{InMemoryKeyStore, KeyStore, SigningKey, VerificationKey};
pub use object_store::{MemoryObjectStore, ObjectStore};
pub use remote_key_store::RemoteKeyStore;
pub use service::{SessionTokenService, INVALID_TOKEN_TYPE, TOKEN_EXPIRED};
