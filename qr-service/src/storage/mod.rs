// Object storage for generated QR images

pub mod s3_client;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;

pub use s3_client::S3Storage;

/// The slice of an S3-style object store the service needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket the objects land in.
    fn bucket(&self) -> &str;

    /// Store `body` under `key`, replacing whatever was there.
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Time-limited GET link for `key`.
    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        response_content_type: &str,
    ) -> Result<String, StorageError>;
}

/// Object key for the QR image of `url`: everything after the last `//`, plus `.png`, under `prefix`.
pub fn storage_key(prefix: &str, url: &str) -> String {
    let tail = url.rsplit("//").next().unwrap_or(url);
    if prefix.is_empty() {
        format!("{}.png", tail)
    } else {
        format!("{}/{}.png", prefix, tail)
    }
}
