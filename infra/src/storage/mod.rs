//! Object store backends for the remote key store
//!
//! Each backend implements `eau_core::ObjectStore` and reports missing
//! objects as `ObjectStoreError::NotFound`, which is what lets the key store
//! tell an empty bucket apart from an outage.

mod file;
#[cfg(feature = "aws-s3")]
mod s3;

pub use file::FileObjectStore;
#[cfg(feature = "aws-s3")]
pub use s3::S3ObjectStore;
