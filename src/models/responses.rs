//! Response DTOs for the product cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{Backend, CacheStats, ClearSummary};
use crate::consent::ConsentState;

/// Response body for GET and PUT /consent
#[derive(Debug, Clone, Serialize)]
pub struct ConsentResponse {
    /// Recorded decision, null if never asked
    pub permission: Option<ConsentState>,
    /// Whether caching is currently allowed
    pub has_permission: bool,
    /// Whether the consent banner should be shown
    pub should_prompt: bool,
    /// When the decision was recorded, RFC 3339
    pub recorded_at: Option<String>,
}

/// Response body for GET /products/:key
#[derive(Debug, Clone, Serialize)]
pub struct ProductsResponse {
    pub key: String,
    pub data: Value,
}

impl ProductsResponse {
    pub fn new(key: impl Into<String>, data: Value) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }
}

/// Response body for PUT /products/:key
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub key: String,
    /// False when caching is not permitted or storage refused the write
    pub stored: bool,
    /// Backend that took the write
    pub backend: Option<Backend>,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, backend: Option<Backend>) -> Self {
        Self {
            key: key.into(),
            stored: backend.is_some(),
            backend,
        }
    }
}

/// Response body for DELETE /products/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed from cache", key),
            key,
        }
    }
}

/// Response body for DELETE /products
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub structured_removed: usize,
    pub flat_removed: usize,
}

impl From<ClearSummary> for ClearResponse {
    fn from(summary: ClearSummary) -> Self {
        Self {
            structured_removed: summary.structured_removed,
            flat_removed: summary.flat_removed,
        }
    }
}

/// Response body for POST /clear-product-cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearProductCacheResponse {
    pub cleared: bool,
    pub message: String,
}

impl ClearProductCacheResponse {
    pub fn new(cleared: bool) -> Self {
        let message = if cleared {
            "All product caches cleared successfully"
        } else {
            "Product caches could not be cleared"
        };
        Self {
            cleared,
            message: message.to_string(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Backend new entries are written to
    pub backend: Backend,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(backend: Backend) -> Self {
        Self {
            status: "healthy".to_string(),
            backend,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
