//! API Handlers
//!
//! HTTP request handlers exposing the product cache to the storefront UI.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::ProductCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::requests::validate_key;
use crate::models::{
    ClearProductCacheResponse, ClearResponse, ConsentResponse, DeleteResponse, HealthResponse,
    ProductsResponse, SetConsentRequest, SetProductsRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ProductCache>,
}

impl AppState {
    pub fn new(cache: ProductCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(ProductCache::from_config(config)?))
    }

    fn consent_response(&self) -> ConsentResponse {
        let consent = self.cache.consent();
        ConsentResponse {
            permission: self.cache.get_cache_permission(),
            has_permission: self.cache.has_cache_permission(),
            should_prompt: self.cache.should_show_permission_dialog(),
            recorded_at: consent.recorded_at().map(|t| t.to_rfc3339()),
        }
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(key),
    }
}

/// Handler for GET /consent
pub async fn get_consent_handler(State(state): State<AppState>) -> Json<ConsentResponse> {
    Json(state.consent_response())
}

/// Handler for PUT /consent
///
/// Rejecting purges the cache before the response is sent.
pub async fn set_consent_handler(
    State(state): State<AppState>,
    Json(req): Json<SetConsentRequest>,
) -> Result<Json<ConsentResponse>> {
    let decision = req.state()?;
    state.cache.set_cache_permission(decision).await;
    Ok(Json(state.consent_response()))
}

/// Handler for GET /products/:key
///
/// A miss (absent, stale or no consent) is a 404.
pub async fn get_products_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ProductsResponse>> {
    let key = checked_key(key)?;
    match state.cache.get_cached_products(&key).await {
        Some(data) => Ok(Json(ProductsResponse::new(key, data))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /products/:key
pub async fn set_products_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetProductsRequest>,
) -> Result<Json<SetResponse>> {
    let key = checked_key(key)?;
    let backend = state.cache.set_cached_products(&key, req.data).await;
    Ok(Json(SetResponse::new(key, backend)))
}

/// Handler for DELETE /products/:key
pub async fn delete_products_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let key = checked_key(key)?;
    state.cache.delete_cached_products(&key).await;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /products
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(state.cache.clear_all_caches().await.into())
}

/// Handler for POST /clear-product-cache
pub async fn clear_product_cache_handler(
    State(state): State<AppState>,
) -> Json<ClearProductCacheResponse> {
    let cleared = state.cache.clear_product_cache().await;
    Json(ClearProductCacheResponse::new(cleared))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.preferred_backend().await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Backend;
    use crate::storage::{MemoryConnector, MemoryFlatStore};
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(ProductCache::new(
            Arc::new(MemoryFlatStore::new()),
            Arc::new(MemoryConnector::new()),
        ))
    }

    async fn accept(state: &AppState) {
        let req = SetConsentRequest {
            permission: "accepted".to_string(),
        };
        let Json(resp) = set_consent_handler(State(state.clone()), Json(req))
            .await
            .unwrap();
        assert!(resp.has_permission);
    }

    #[tokio::test]
    async fn test_set_and_get_products() {
        let state = test_state();
        accept(&state).await;

        let req = SetProductsRequest {
            data: json!([{"id": 1}]),
        };
        let set = set_products_handler(State(state.clone()), Path("shirts".to_string()), Json(req))
            .await
            .unwrap();
        assert!(set.stored);
        assert_eq!(set.backend, Some(Backend::Structured));

        let got = get_products_handler(State(state), Path("shirts".to_string()))
            .await
            .unwrap();
        assert_eq!(got.data, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_set_without_consent_is_not_stored() {
        let state = test_state();

        let req = SetProductsRequest { data: json!([]) };
        let set = set_products_handler(State(state.clone()), Path("shirts".to_string()), Json(req))
            .await
            .unwrap();
        assert!(!set.stored);

        let result = get_products_handler(State(state), Path("shirts".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_consent_roundtrip() {
        let state = test_state();

        let before = get_consent_handler(State(state.clone())).await;
        assert!(before.should_prompt);
        assert!(before.permission.is_none());

        accept(&state).await;
        let after = get_consent_handler(State(state)).await;
        assert!(after.has_permission);
        assert!(!after.should_prompt);
        assert!(after.recorded_at.is_some());
    }

    #[tokio::test]
    async fn test_invalid_consent_value() {
        let state = test_state();
        let req = SetConsentRequest {
            permission: "sometimes".to_string(),
        };

        let result = set_consent_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        accept(&state).await;
        state.cache.set_cached_products("shirts", json!([1])).await;

        let resp = delete_products_handler(State(state.clone()), Path("shirts".to_string()))
            .await
            .unwrap();
        assert_eq!(resp.key, "shirts");
        assert!(state.cache.get_cached_products("shirts").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_handlers() {
        let state = test_state();
        accept(&state).await;
        state.cache.set_cached_products("a", json!([1])).await;
        state.cache.set_cached_products("b", json!([2])).await;

        let cleared = clear_all_handler(State(state.clone())).await;
        assert_eq!(cleared.structured_removed, 2);

        let manual = clear_product_cache_handler(State(state)).await;
        assert!(manual.cleared);
    }

    #[tokio::test]
    async fn test_stats_and_health_handlers() {
        let state = test_state();

        let stats = stats_handler(State(state.clone())).await;
        assert_eq!(stats.stats.hits, 0);
        assert_eq!(stats.hit_rate, 0.0);

        let health = health_handler(State(state)).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.backend, Backend::Structured);
    }
}
