//! Key store backed by a durable object store shared between replicas

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eau_shared::KeyStoreConfig;
use tokio::sync::OnceCell;

use crate::domain::entities::KeyPair;
use crate::errors::{KeyError, ObjectStoreError};

use super::key_store::{generate_key_pair, KeyStore};
use super::object_store::ObjectStore;

/// Key store whose source of truth is an [`ObjectStore`]
///
/// On first use the PEM pair is fetched from the configured paths. When the
/// private key is absent a new pair is generated and both halves are
/// written before the pair is cached, so independently created instances
/// converge on the same material. Two replicas racing on an empty store may
/// both generate; the last writer wins.
pub struct RemoteKeyStore<S: ObjectStore> {
    store: S,
    signing_key_path: String,
    verification_key_path: String,
    timeout: Duration,
    key_pair: OnceCell<Arc<KeyPair>>,
    generations: AtomicUsize,
}

impl<S: ObjectStore> std::fmt::Debug for RemoteKeyStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteKeyStore")
            .field("signing_key_path", &self.signing_key_path)
            .field("verification_key_path", &self.verification_key_path)
            .field("timeout", &self.timeout)
            .field("loaded", &self.key_pair.initialized())
            .finish()
    }
}

impl<S: ObjectStore> RemoteKeyStore<S> {
    /// Creates a remote key store from configuration
    ///
    /// # Arguments
    ///
    /// * `store` - Backend holding the PEM objects
    /// * `config` - Object paths and I/O timeout
    pub fn new(store: S, config: &KeyStoreConfig) -> Self {
        Self::with_paths(
            store,
            config.signing_key_path.clone(),
            config.verification_key_path.clone(),
            config.timeout(),
        )
    }

    pub fn with_paths(
        store: S,
        signing_key_path: impl Into<String>,
        verification_key_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            signing_key_path: signing_key_path.into(),
            verification_key_path: verification_key_path.into(),
            timeout,
            key_pair: OnceCell::new(),
            generations: AtomicUsize::new(0),
        }
    }

    /// Backend handle
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of pairs this instance has generated so far
    pub fn generation_count(&self) -> usize {
        self.generations.load(Ordering::SeqCst)
    }

    /// Bounds one store call by the configured timeout
    async fn bounded<T, F>(&self, path: &str, call: F) -> Result<T, KeyError>
    where
        F: Future<Output = Result<T, ObjectStoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| storage_error(path, e)),
            Err(_) => Err(KeyError::Timeout {
                path: path.to_string(),
                timeout: self.timeout,
            }),
        }
    }

    /// Reads a PEM object; `None` when the object does not exist
    async fn fetch(&self, path: &str) -> Result<Option<String>, KeyError> {
        let bytes = match tokio::time::timeout(self.timeout, self.store.get(path)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(ObjectStoreError::NotFound { .. })) => return Ok(None),
            Ok(Err(e)) => return Err(storage_error(path, e)),
            Err(_) => {
                return Err(KeyError::Timeout {
                    path: path.to_string(),
                    timeout: self.timeout,
                })
            }
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| KeyError::Malformed {
                path: path.to_string(),
                message: "key object is not UTF-8 PEM text".to_string(),
            })
    }

    async fn push(&self, path: &str, pem: &str) -> Result<(), KeyError> {
        self.bounded(path, self.store.put(path, pem.as_bytes().to_vec()))
            .await
    }

    async fn push_pair(&self, key_pair: &KeyPair) -> Result<(), KeyError> {
        self.push(&self.signing_key_path, key_pair.private_key_pem())
            .await?;
        self.push(&self.verification_key_path, key_pair.public_key_pem())
            .await
    }

    async fn generate(&self) -> Result<KeyPair, KeyError> {
        let key_pair = generate_key_pair().await?;
        self.generations.fetch_add(1, Ordering::SeqCst);
        Ok(key_pair)
    }

    async fn load_or_create(&self) -> Result<Arc<KeyPair>, KeyError> {
        let Some(private_pem) = self.fetch(&self.signing_key_path).await? else {
            tracing::warn!(
                event = "signing_key_missing",
                path = %self.signing_key_path,
                "No signing key in store, generating a new pair"
            );
            let key_pair = self.generate().await?;
            self.push_pair(&key_pair).await?;
            tracing::info!(
                event = "key_pair_generated",
                store = "remote",
                path = %self.signing_key_path,
                "Generated and stored signing key pair"
            );
            return Ok(Arc::new(key_pair));
        };

        let key_pair = KeyPair::from_private_pem(&private_pem, &self.signing_key_path)?;
        match self.fetch(&self.verification_key_path).await? {
            Some(public_pem) => {
                key_pair.verify_public_pem(&public_pem, &self.verification_key_path)?;
            }
            None => {
                tracing::warn!(
                    event = "verification_key_missing",
                    path = %self.verification_key_path,
                    "Verification key missing, deriving it from the signing key"
                );
                self.push(&self.verification_key_path, key_pair.public_key_pem())
                    .await?;
            }
        }

        tracing::info!(
            event = "key_pair_loaded",
            path = %self.signing_key_path,
            "Loaded signing key pair from store"
        );
        Ok(Arc::new(key_pair))
    }
}

fn storage_error(path: &str, err: ObjectStoreError) -> KeyError {
    KeyError::Storage {
        path: path.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl<S: ObjectStore> KeyStore for RemoteKeyStore<S> {
    /// Generates a pair and writes both halves to the store
    ///
    /// The pair already cached by this instance stays active; instances
    /// created afterwards load the new material.
    async fn create_key_pair(&self) -> Result<Arc<KeyPair>, KeyError> {
        let key_pair = self.generate().await?;
        self.push_pair(&key_pair).await?;
        tracing::info!(
            event = "key_pair_provisioned",
            path = %self.signing_key_path,
            "Wrote new signing key pair to store"
        );
        Ok(Arc::new(key_pair))
    }

    async fn key_pair(&self) -> Result<Arc<KeyPair>, KeyError> {
        let result = self
            .key_pair
            .get_or_try_init(|| self.load_or_create())
            .await
            .map(Arc::clone);

        if let Err(e) = &result {
            tracing::error!(
                event = "key_pair_unavailable",
                error = %e,
                "Failed to materialize signing key pair"
            );
        }
        result
    }
}
