//! Custody of the RSA key pair that signs session tokens

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, EncodingKey};
use once_cell::sync::Lazy;
use tokio::sync::OnceCell;

use crate::domain::entities::KeyPair;
use crate::errors::KeyError;

/// Private half of the active pair
#[derive(Debug, Clone)]
pub struct SigningKey(Arc<KeyPair>);

impl SigningKey {
    pub fn encoding_key(&self) -> &EncodingKey {
        self.0.encoding_key()
    }
}

/// Public half of the active pair
#[derive(Debug, Clone)]
pub struct VerificationKey(Arc<KeyPair>);

impl VerificationKey {
    pub fn decoding_key(&self) -> &DecodingKey {
        self.0.decoding_key()
    }

    pub fn public_key_pem(&self) -> &str {
        self.0.public_key_pem()
    }
}

/// Produces and caches the session signing key pair
///
/// Getters materialize the pair on first use and return the same pair for
/// the lifetime of the store, even under concurrent first access.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Generates a fresh pair
    ///
    /// The returned pair is not installed as the active pair.
    async fn create_key_pair(&self) -> Result<Arc<KeyPair>, KeyError>;

    /// Active pair, materialized on first call
    async fn key_pair(&self) -> Result<Arc<KeyPair>, KeyError>;

    async fn signing_key(&self) -> Result<SigningKey, KeyError> {
        self.key_pair().await.map(SigningKey)
    }

    async fn verification_key(&self) -> Result<VerificationKey, KeyError> {
        self.key_pair().await.map(VerificationKey)
    }
}

/// Runs RSA generation off the async worker threads
pub(crate) async fn generate_key_pair() -> Result<KeyPair, KeyError> {
    tokio::task::spawn_blocking(KeyPair::generate)
        .await
        .map_err(|e| KeyError::Generation {
            message: format!("key generation task failed: {}", e),
        })?
}

static SHARED_IN_MEMORY: Lazy<Arc<InMemoryKeyStore>> = Lazy::new(|| Arc::new(InMemoryKeyStore::new()));

/// Key store that generates its pair in memory and never persists it
///
/// Suited to single-process deployments and development. Tokens signed by
/// one process cannot be verified by another.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    key_pair: OnceCell<Arc<KeyPair>>,
    generations: AtomicUsize,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose active pair is already known
    pub fn with_key_pair(key_pair: KeyPair) -> Self {
        Self {
            key_pair: OnceCell::new_with(Some(Arc::new(key_pair))),
            generations: AtomicUsize::new(0),
        }
    }

    /// Process-wide instance for composition roots
    pub fn shared() -> Arc<InMemoryKeyStore> {
        Arc::clone(&SHARED_IN_MEMORY)
    }

    /// Number of pairs this store has generated so far
    pub fn generation_count(&self) -> usize {
        self.generations.load(Ordering::SeqCst)
    }

    async fn generate(&self) -> Result<Arc<KeyPair>, KeyError> {
        let key_pair = generate_key_pair().await?;
        self.generations.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(key_pair))
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn create_key_pair(&self) -> Result<Arc<KeyPair>, KeyError> {
        self.generate().await
    }

    async fn key_pair(&self) -> Result<Arc<KeyPair>, KeyError> {
        self.key_pair
            .get_or_try_init(|| async {
                let key_pair = self.generate().await?;
                tracing::info!(
                    event = "key_pair_generated",
                    store = "memory",
                    "Generated in-memory signing key pair"
                );
                Ok::<_, KeyError>(key_pair)
            })
            .await
            .map(Arc::clone)
    }
}
