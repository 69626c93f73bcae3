use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure while turning a payload into a PNG.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("PNG rendering failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Failure talking to the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("Presigning {key} failed: {message}")]
    Presign { key: String, message: String },

    #[error("Invalid presign expiry: {0}")]
    InvalidExpiry(String),
}

/// Everything that can go wrong while issuing a QR link.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Issue(#[from] IssueError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            // Client-caused encoding failures are not told apart from backend failures.
            ApiError::Issue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
