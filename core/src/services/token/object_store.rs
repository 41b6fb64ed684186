//! Durable blob storage consumed by the remote key store

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::ObjectStoreError;

/// Minimal get/put interface over a durable object store
///
/// `get` must report a missing object as `ObjectStoreError::NotFound`; any
/// other failure is treated as an outage, never as absence.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError>;

    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError>;
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        (**self).get(path).await
    }

    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        (**self).put(path, bytes).await
    }
}

/// Process-local object store
///
/// Clones share the same objects, which lets several key stores in one
/// process behave like replicas sharing a bucket.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object
    pub fn with_object(self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(path.into(), bytes.into());
        }
        self
    }

    /// Current content of an object
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(path: &str) -> ObjectStoreError {
        ObjectStoreError::Backend {
            path: path.to_string(),
            message: "object map lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let objects = self.objects.lock().map_err(|_| Self::poisoned(path))?;
        objects
            .get(path)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound {
                path: path.to_string(),
            })
    }

    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        let mut objects = self.objects.lock().map_err(|_| Self::poisoned(path))?;
        objects.insert(path.to_string(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let store = MemoryObjectStore::new();
        let err = store.get("jwt/signing_key.pem").await.unwrap_err();
        assert_eq!(
            err,
            ObjectStoreError::NotFound {
                path: "jwt/signing_key.pem".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_clones_share_objects() {
        let store = MemoryObjectStore::new();
        let replica = store.clone();

        store.put("a", b"one".to_vec()).await.unwrap();
        assert_eq!(replica.get("a").await.unwrap(), b"one".to_vec());
        assert_eq!(replica.len(), 1);
    }
}
