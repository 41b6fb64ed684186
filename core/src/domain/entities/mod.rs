//! Domain entities representing credentials and the material behind them.

pub mod email_token;
pub mod key_pair;
pub mod token;

// Re-export commonly used types
pub use email_token::{EmailVerificationClaims, EMAIL_TOKEN_EXPIRY_HOURS};
pub use key_pair::{KeyPair, RSA_KEY_BITS};
pub use token::{copy_token_claims, ClaimMap, SessionClaims, TokenType, RESERVED_CLAIMS};
