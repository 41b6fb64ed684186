//! Symmetric encryption for stateless email verification tokens

pub mod email_token;
pub mod key_manager;

// Re-export main types
pub use email_token::{EmailTokenServiceConfig, EmailVerificationTokenService, NONCE_LEN};
pub use key_manager::{SymmetricKey, SymmetricKeyProvider, SYMMETRIC_KEY_LEN};
