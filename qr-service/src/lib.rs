//! QR issuance service: URL in, presigned link to a stored QR-code PNG out.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod qr;
pub mod service;
pub mod storage;

use service::QrIssuer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<QrIssuer>,
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/generate-qr/", post(handlers::qr::generate_qr))
        .route("/generate-qr", post(handlers::qr::generate_qr))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::error::StorageError;
    use crate::middleware::cors::cors_layer;
    use crate::qr::{QrEncoder, QrSettings};
    use crate::service::tests::MemoryStore;
    use crate::storage::{MockObjectStore, ObjectStore};

    fn app(store: Arc<dyn ObjectStore>) -> Router {
        let issuer = QrIssuer::new(
            QrEncoder::new(QrSettings::default()),
            store,
            "qr_codes",
            Duration::from_secs(3600),
        );
        let cors = cors_layer(&["http://localhost:3000".to_string()]).unwrap();
        build_router(
            AppState {
                issuer: Arc::new(issuer),
            },
            cors,
        )
    }

    fn generate(query: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/generate-qr/{}", query))
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_qr_returns_presigned_link() {
        let store = Arc::new(MemoryStore::default());
        let response = app(store.clone())
            .oneshot(generate("?url=https%3A%2F%2Fex.com%2Fp"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({
                "qr_code_url": "https://bucket.test/qr_codes/ex.com/p.png?X-Amz-Expires=3600"
            })
        );
        assert!(store.objects.lock().await.contains_key("qr_codes/ex.com/p.png"));
    }

    #[tokio::test]
    async fn test_route_without_trailing_slash() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/generate-qr?url=https%3A%2F%2Fa.io")
            .body(Body::empty())
            .unwrap();
        let response = app(Arc::new(MemoryStore::default()))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_payload_is_500_with_encoding_detail() {
        let response = app(Arc::new(MemoryStore::default()))
            .oneshot(generate(
                "?url=https%3A%2F%2Fexample.com%2Fa%2Frather%2Flong%2Fpath",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("QR encoding failed"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_500_and_service_keeps_serving() {
        let mut store = MockObjectStore::new();
        store.expect_bucket().return_const("qrcodebucket123".to_string());
        store.expect_put_object().returning(|key, _, _| {
            Err(StorageError::Upload {
                key: key.to_string(),
                message: "InvalidAccessKeyId".to_string(),
            })
        });
        let router = app(Arc::new(store));

        for _ in 0..2 {
            let response = router
                .clone()
                .oneshot(generate("?url=https%3A%2F%2Fa.io"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = json_body(response).await;
            assert!(body["detail"].as_str().unwrap().contains("InvalidAccessKeyId"));
        }
    }

    #[tokio::test]
    async fn test_missing_url_is_422() {
        let response = app(Arc::new(MemoryStore::default()))
            .oneshot(generate(""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json_body(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let request = Request::builder()
            .uri("/generate-qr/?url=https%3A%2F%2Fa.io")
            .body(Body::empty())
            .unwrap();
        let response = app(Arc::new(MemoryStore::default()))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_concurrent_requests_get_distinct_links() {
        let router = app(Arc::new(MemoryStore::default()));
        let (a, b) = tokio::join!(
            router.clone().oneshot(generate("?url=https%3A%2F%2Fa.io%2Fx")),
            router.clone().oneshot(generate("?url=https%3A%2F%2Fb.io%2Fy")),
        );
        let a = json_body(a.unwrap()).await;
        let b = json_body(b.unwrap()).await;

        assert!(a["qr_code_url"].as_str().unwrap().contains("qr_codes/a.io/x.png"));
        assert!(b["qr_code_url"].as_str().unwrap().contains("qr_codes/b.io/y.png"));
    }

    #[tokio::test]
    async fn test_cors_allows_only_listed_origin() {
        let preflight = |origin: &str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/generate-qr/")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap()
        };
        let router = app(Arc::new(MemoryStore::default()));

        let allowed = router
            .clone()
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );

        let denied = router.oneshot(preflight("http://evil.test")).await.unwrap();
        assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_health_route() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(Arc::new(MemoryStore::default()))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "qr-service");
    }
}
