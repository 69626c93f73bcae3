use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ConfigError;

/// Exactly the listed origins; any method and request header.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS",
                value: origin.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}
