//! Object storage for uploaded and saved images.
//!
//! [`ObjectStore`] is the seam used by the task service and the upload
//! handlers. [`s3::S3Storage`] talks to any S3-compatible bucket (Aliyun OSS
//! in production); [`memory::MemoryStorage`] keeps objects in a map.

use async_trait::async_trait;

pub mod memory;
pub mod s3;

pub use memory::MemoryStorage;
pub use s3::{S3Storage, StorageConfig};

/// An object that has been written to the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Public URL the object is served from.
    pub url: String,
    pub size: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to upload object '{key}': {message}")]
    Upload { key: String, message: String },

    #[error("Failed to delete object '{key}': {message}")]
    Delete { key: String, message: String },
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key` with public-read access.
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Remove `key`. Deleting a missing key is not an error.
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL for `key`, whether or not it exists.
    fn public_url(&self, key: &str) -> String;
}

/// Join a bucket base URL and an object key with exactly one slash.
pub fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
