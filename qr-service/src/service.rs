use std::{sync::Arc, time::Duration};

use tracing::{debug, info};

use crate::error::IssueError;
use crate::qr::QrEncoder;
use crate::storage::{storage_key, ObjectStore};

pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Result of a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedQr {
    pub key: String,
    pub link: String,
}

/// Encodes a URL, uploads the PNG and presigns a download link.
pub struct QrIssuer {
    encoder: QrEncoder,
    store: Arc<dyn ObjectStore>,
    key_prefix: String,
    link_ttl: Duration,
}

impl QrIssuer {
    pub fn new(
        encoder: QrEncoder,
        store: Arc<dyn ObjectStore>,
        key_prefix: impl Into<String>,
        link_ttl: Duration,
    ) -> Self {
        Self {
            encoder,
            store,
            key_prefix: key_prefix.into(),
            link_ttl,
        }
    }

    /// An upload that succeeds followed by a failed presign leaves the object in place.
    pub async fn issue(&self, url: &str) -> Result<IssuedQr, IssueError> {
        let png = self.encoder.encode_png(url)?;
        let key = storage_key(&self.key_prefix, url);
        let bucket = self.store.bucket();
        info!(
            url,
            key = %key,
            bucket,
            size = png.len(),
            "QR code generated"
        );

        self.store.put_object(&key, png, PNG_CONTENT_TYPE).await?;
        info!(key = %key, bucket, "QR code uploaded");

        let link = self
            .store
            .presign_get(&key, self.link_ttl, PNG_CONTENT_TYPE)
            .await?;
        debug!(key = %key, link = %link, ttl_secs = self.link_ttl.as_secs(), "Presigned URL issued");

        Ok(IssuedQr { key, link })
    }
}
