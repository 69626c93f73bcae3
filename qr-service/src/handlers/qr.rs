use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateQrParams {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QrCodeResponse {
    pub qr_code_url: String,
}

/// Handle `POST /generate-qr/?url=...`
pub async fn generate_qr(
    State(state): State<AppState>,
    params: Result<Query<GenerateQrParams>, QueryRejection>,
) -> ApiResult<Json<QrCodeResponse>> {
    let Query(params) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    info!(url = %params.url, "Received request to generate QR code");

    match state.issuer.issue(&params.url).await {
        Ok(issued) => Ok(Json(QrCodeResponse {
            qr_code_url: issued.link,
        })),
        Err(e) => {
            error!(url = %params.url, error = %e, "QR code generation or upload failed");
            Err(e.into())
        }
    }
}
