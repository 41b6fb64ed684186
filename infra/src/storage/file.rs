//! Local filesystem object store
//!
//! Intended for single-host deployments where several processes share one
//! directory instead of a bucket.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use eau_core::{ObjectStore, ObjectStoreError};

/// Object store rooted at a directory; object paths are relative to the root
#[derive(Debug, Clone)]
pub struct FileObjectStore {
    root: PathBuf,
}

impl FileObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an object path to a file below the root
    fn resolve(&self, path: &str) -> Result<PathBuf, ObjectStoreError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));

        if path.is_empty() || escapes {
            return Err(ObjectStoreError::Backend {
                path: path.to_string(),
                message: "object path must be relative and stay inside the store root".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

fn backend_error(path: &str, err: std::io::Error) -> ObjectStoreError {
    ObjectStoreError::Backend {
        path: path.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let file = self.resolve(path)?;
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ObjectStoreError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(backend_error(path, e)),
        }
    }

    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| backend_error(path, e))?;
        }

        // Readers never observe a half-written key
        let staging = file.with_extension("tmp");
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(|e| backend_error(path, e))?;
        tokio::fs::rename(&staging, &file)
            .await
            .map_err(|e| backend_error(path, e))?;

        tracing::debug!(event = "object_written", path, bytes = bytes.len(), "Wrote object to disk");
        Ok(())
    }
}
