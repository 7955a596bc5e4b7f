//! Request DTOs for the product cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;
use crate::consent::ConsentState;
use crate::error::CacheError;

/// Request body for PUT /consent
#[derive(Debug, Clone, Deserialize)]
pub struct SetConsentRequest {
    /// `"accepted"` or `"rejected"`
    pub permission: String,
}

impl SetConsentRequest {
    /// Parses the requested decision.
    pub fn state(&self) -> Result<ConsentState, CacheError> {
        self.permission.parse()
    }
}

/// Request body for PUT /products/:key
///
/// `data` is stored verbatim; any JSON value is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct SetProductsRequest {
    pub data: Value,
}

/// Validates a cache key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
