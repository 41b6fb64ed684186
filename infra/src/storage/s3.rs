//! AWS S3 object store
//!
//! Credentials come from the default AWS provider chain (environment,
//! profile, instance role); only the region and bucket are configured here.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{config::Region, error::DisplayErrorContext, primitives::ByteStream, Client as S3Client};
use eau_core::{ObjectStore, ObjectStoreError};
use eau_shared::KeyStoreConfig;
use tracing::{debug, info};

use crate::InfrastructureError;

/// Default region when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// S3 bucket used as an object store
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `bucket` - Bucket holding the key objects
    /// * `region` - AWS region of the bucket
    pub async fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        let region = region.into();
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;
        let bucket = bucket.into();

        info!(event = "s3_store_init", bucket = %bucket, region = %region, "S3 object store initialized");

        Self::with_client(S3Client::new(&aws_config), bucket)
    }

    /// Wrap an existing client
    pub fn with_client(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Create from key store configuration; the bucket is required
    pub async fn from_config(config: &KeyStoreConfig) -> Result<Self, InfrastructureError> {
        let bucket = config.bucket.clone().ok_or_else(|| {
            InfrastructureError::Config("KEY_STORE_BUCKET must be set for the s3 backend".to_string())
        })?;
        let region = config
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self::new(bucket, region).await)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    return Err(ObjectStoreError::NotFound {
                        path: path.to_string(),
                    });
                }
                return Err(ObjectStoreError::Backend {
                    path: path.to_string(),
                    message: DisplayErrorContext(&err).to_string(),
                });
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::Backend {
                path: path.to_string(),
                message: format!("failed to read object body: {}", e),
            })?;

        debug!(event = "object_read", bucket = %self.bucket, path, "Read object from S3");
        Ok(body.into_bytes().to_vec())
    }

    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type("application/x-pem-file")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| ObjectStoreError::Backend {
                path: path.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        debug!(event = "object_written", bucket = %self.bucket, path, "Wrote object to S3");
        Ok(())
    }
}
