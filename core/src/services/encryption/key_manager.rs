//! Symmetric key custody for email verification tokens

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aes_gcm::{Aes256Gcm, Key};
use once_cell::sync::{Lazy, OnceCell};
use rand::{rngs::OsRng, RngCore};

use crate::errors::{KeyError, ValidationError};

/// AES-256 key length in bytes
pub const SYMMETRIC_KEY_LEN: usize = 32;

static SHARED_PROVIDER: Lazy<Arc<SymmetricKeyProvider>> =
    Lazy::new(|| Arc::new(SymmetricKeyProvider::new()));

/// 256-bit AES key
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_LEN]);

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

impl SymmetricKey {
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_LEN] {
        &self.0
    }

    /// Key in the form the AES-GCM cipher takes
    pub fn cipher_key(&self) -> &Key<Aes256Gcm> {
        Key::<Aes256Gcm>::from_slice(&self.0)
    }
}

/// Lazily generated process-lifetime AES key
///
/// The key is created on the first `key()` call and kept in memory only, so
/// outstanding email tokens become unreadable when the process restarts.
#[derive(Debug, Default)]
pub struct SymmetricKeyProvider {
    key: OnceCell<SymmetricKey>,
    generations: AtomicUsize,
}

impl SymmetricKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with a provided key (for testing or recovery)
    pub fn with_key(key: &[u8]) -> Result<Self, ValidationError> {
        let key: [u8; SYMMETRIC_KEY_LEN] =
            key.try_into().map_err(|_| ValidationError::InvalidLength {
                field: "symmetric_key".to_string(),
                expected: SYMMETRIC_KEY_LEN,
                actual: key.len(),
            })?;

        Ok(Self {
            key: OnceCell::with_value(SymmetricKey(key)),
            generations: AtomicUsize::new(0),
        })
    }

    /// Process-wide provider for composition roots
    pub fn shared() -> Arc<SymmetricKeyProvider> {
        Arc::clone(&SHARED_PROVIDER)
    }

    /// The active key, generated on first call
    pub fn key(&self) -> Result<&SymmetricKey, KeyError> {
        self.key.get_or_try_init(|| {
            let key = Self::generate_key()?;
            self.generations.fetch_add(1, Ordering::SeqCst);
            tracing::info!(event = "symmetric_key_generated", "Generated email token encryption key");
            Ok(key)
        })
    }

    /// Number of keys this provider has generated so far
    pub fn generation_count(&self) -> usize {
        self.generations.load(Ordering::SeqCst)
    }

    fn generate_key() -> Result<SymmetricKey, KeyError> {
        let mut key = [0u8; SYMMETRIC_KEY_LEN];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| KeyError::Generation {
                message: format!("Failed to generate symmetric key: {}", e),
            })?;
        Ok(SymmetricKey(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_key_generated_once() {
        let provider = SymmetricKeyProvider::new();

        let first = provider.key().unwrap().clone();
        let second = provider.key().unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(provider.generation_count(), 1);
    }

    #[test]
    fn test_concurrent_first_access() {
        let provider = Arc::new(SymmetricKeyProvider::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let provider = Arc::clone(&provider);
                thread::spawn(move || provider.key().unwrap().clone())
            })
            .collect();
        let keys: Vec<SymmetricKey> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(keys.iter().all(|key| key == &keys[0]));
        assert_eq!(provider.generation_count(), 1);
    }

    #[test]
    fn test_with_key() {
        let provider = SymmetricKeyProvider::with_key(&[7u8; 32]).unwrap();
        assert_eq!(provider.key().unwrap().as_bytes(), &[7u8; 32]);
        assert_eq!(provider.generation_count(), 0);
    }

    #[test]
    fn test_with_key_rejects_wrong_length() {
        let err = SymmetricKeyProvider::with_key(&[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidLength {
                field: "symmetric_key".to_string(),
                expected: 32,
                actual: 16,
            }
        );
    }

    #[test]
    fn test_independent_providers_differ() {
        let a = SymmetricKeyProvider::new();
        let b = SymmetricKeyProvider::new();
        assert_ne!(a.key().unwrap(), b.key().unwrap());
    }

    #[test]
    fn test_debug_hides_key() {
        let provider = SymmetricKeyProvider::with_key(&[7u8; 32]).unwrap();
        assert_eq!(format!("{:?}", provider.key().unwrap()), "SymmetricKey(..)");
    }
}
