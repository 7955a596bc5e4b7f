//! API Routes
//!
//! Configures the Axum router with all product cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_all_handler, clear_product_cache_handler, delete_products_handler,
    get_consent_handler, get_products_handler, health_handler, set_consent_handler,
    set_products_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /consent` / `PUT /consent` - Read or record the caching decision
/// - `GET /products/:key` - Cached product list, 404 on miss
/// - `PUT /products/:key` - Cache a product list
/// - `DELETE /products/:key` - Drop one cached list
/// - `DELETE /products` - Drop every cached list
/// - `POST /clear-product-cache` - Manual purge for operators
/// - `GET /stats` - Cache counters
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: the storefront front end runs on another origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/consent", get(get_consent_handler).put(set_consent_handler))
        .route(
            "/products/:key",
            get(get_products_handler)
                .put(set_products_handler)
                .delete(delete_products_handler),
        )
        .route("/products", delete(clear_all_handler))
        .route("/clear-product-cache", post(clear_product_cache_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ProductCache;
    use crate::storage::{MemoryConnector, MemoryFlatStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = ProductCache::new(
            Arc::new(MemoryFlatStore::new()),
            Arc::new(MemoryConnector::new()),
        );
        create_router(AppState::new(cache))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_consent_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/consent").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_products_miss() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/products/shirts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_all_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
