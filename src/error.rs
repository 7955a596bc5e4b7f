//! Error types for the product cache
//!
//! Provides unified error handling using thiserror. Storage layers return
//! these errors; the `ProductCache` facade absorbs them and degrades to
//! "caching disabled" behaviour.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the product cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backend cannot be used in this environment
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// A backend operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem failure in a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored entry could not be decoded
    #[error("Malformed entry: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Backend did not answer in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No fresh entry for the key
    #[error("Cache miss: {0}")]
    NotFound(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Timeout(_) | CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Storage(_) | CacheError::Io(_) | CacheError::Malformed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the product cache.
pub type Result<T> = std::result::Result<T, CacheError>;
