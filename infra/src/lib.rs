//! # Infrastructure Layer
//!
//! Concrete implementations behind the ports defined in `eau_core`:
//!
//! - **Storage**: object store backends for the remote key store
//!   (AWS S3, local filesystem)
//! - **Telemetry**: tracing subscriber installation
//! - **Key stores**: construction of the configured key store
//!
//! ## Features
//!
//! - `aws-s3`: Enable the S3 object store (default)

use std::sync::Arc;

use eau_core::{InMemoryKeyStore, KeyStore, RemoteKeyStore};
use eau_shared::{KeyStoreBackend, KeyStoreConfig};

/// Object store backends
pub mod storage;

/// Tracing subscriber setup
pub mod telemetry;

pub use storage::FileObjectStore;
#[cfg(feature = "aws-s3")]
pub use storage::S3ObjectStore;

/// Build the key store selected by configuration
///
/// The memory backend returns the process-wide in-memory store; the other
/// backends wrap a fresh object store client in a [`RemoteKeyStore`].
pub async fn initialize_key_store(
    config: &KeyStoreConfig,
) -> Result<Arc<dyn KeyStore>, InfrastructureError> {
    tracing::info!(
        event = "key_store_init",
        backend = %config.backend,
        "Initializing key store"
    );

    let key_store: Arc<dyn KeyStore> = match config.backend {
        KeyStoreBackend::Memory => InMemoryKeyStore::shared(),
        KeyStoreBackend::File => {
            let directory = config.directory.as_deref().ok_or_else(|| {
                InfrastructureError::Config("KEY_STORE_DIR must be set for the file backend".to_string())
            })?;
            Arc::new(RemoteKeyStore::new(FileObjectStore::new(directory), config))
        }
        #[cfg(feature = "aws-s3")]
        KeyStoreBackend::S3 => {
            let store = S3ObjectStore::from_config(config).await?;
            Arc::new(RemoteKeyStore::new(store, config))
        }
        #[cfg(not(feature = "aws-s3"))]
        KeyStoreBackend::S3 => {
            return Err(InfrastructureError::Config(
                "S3 key store requested but the aws-s3 feature is disabled".to_string(),
            ))
        }
    };

    Ok(key_store)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
