//! Business services: session tokens, email verification tokens and the
//! key material behind them.

pub mod clock;
pub mod encryption;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use encryption::{
    EmailTokenServiceConfig, EmailVerificationTokenService, SymmetricKey, SymmetricKeyProvider,
};
pub use token::{
    extract_bearer_token, InMemoryKeyStore, KeyStore, MemoryObjectStore, ObjectStore,
    RemoteKeyStore, SessionTokenService, SigningKey, TokenServiceConfig, VerificationKey,
};
