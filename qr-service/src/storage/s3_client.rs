//! S3-compatible object storage backend
//!
//! Works against AWS S3 or anything speaking the same API (MinIO, etc.).
//! The client is built once at startup and shared by every request.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use tracing::{debug, info};

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::StorageError;

const CREDENTIALS_PROVIDER: &str = "qr-service-config";

/// S3 client for object storage operations
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Build the client. Static keys from config win; otherwise the default AWS provider chain is used.
    pub async fn connect(config: &StorageConfig) -> Self {
        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint,
            "Initializing S3 client"
        );

        let client = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let mut builder = aws_sdk_s3::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .credentials_provider(Credentials::new(
                        access_key.clone(),
                        secret_key.clone(),
                        None,
                        None,
                        CREDENTIALS_PROVIDER,
                    ))
                    .force_path_style(config.force_path_style);
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint_url(endpoint);
                }
                Client::from_conf(builder.build())
            }
            _ => {
                let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(aws_config::Region::new(config.region.clone()))
                    .load()
                    .await;
                let mut builder =
                    aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint_url(endpoint);
                }
                Client::from_conf(builder.build())
            }
        };

        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        debug!(bucket = %self.bucket, key, size = body.len(), "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        response_content_type: &str,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::InvalidExpiry(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .response_content_type(response_content_type)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(presigned.uri().to_string())
    }
}
