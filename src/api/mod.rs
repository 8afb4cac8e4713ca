//! HTTP surface of the chunking service.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/chunk", post(handlers::chunk_chapter))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::types::ChunkingConfig;
    use handlers::{ChunkResponse, ErrorResponse};

    fn app() -> Router {
        router(Arc::new(AppState {
            chunking: ChunkingConfig::default(),
        }))
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chunk")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chunk_endpoint() {
        let statement = "A finite group of prime order is cyclic. ".repeat(4);
        let request = post_json(serde_json::json!({
            "markdown": format!("# Groups\n\n## Lagrange\n\n**Corollary.** {}", statement),
            "meta": { "book_key": "aata", "chapter": "Groups" },
        }));

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ChunkResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.count, 1);
        assert_eq!(body.chunks[0].section, "Lagrange");
        assert_eq!(body.chunks[0].meta.book_key, "aata");
        assert_eq!(body.chunks[0].meta.book, "");
    }

    #[tokio::test]
    async fn test_rejects_inverted_budget() {
        let request = post_json(serde_json::json!({
            "markdown": "# T\n\nBody",
            "min_tokens": 900,
            "max_tokens": 100,
        }));

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.error.contains("min_tokens=900"));
    }
}
