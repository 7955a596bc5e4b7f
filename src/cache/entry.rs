//! Cache Entry Module
//!
//! Wraps an opaque product-list payload with its write timestamp and applies
//! the fixed freshness window on read.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Freshness window for every entry: one hour, in milliseconds.
pub const CACHE_TTL_MS: u64 = 60 * 60 * 1000;

// == Cache Entry ==
/// A cached product query result.
///
/// Serialized as `{"key", "data", "timestamp"}` in both backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Application-chosen cache key (e.g. a category name)
    pub key: String,
    /// Opaque payload, never inspected by the cache
    pub data: Value,
    /// Write time (Unix milliseconds)
    pub timestamp: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written at `timestamp`.
    pub fn new(key: impl Into<String>, data: Value, timestamp: u64) -> Self {
        Self {
            key: key.into(),
            data,
            timestamp,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the write. Entries stamped in the future
    /// (clock skew) have age zero.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Is Fresh ==
    /// Checks the entry against the TTL.
    ///
    /// Boundary condition: an entry whose age equals the TTL is already stale.
    pub fn is_fresh_at(&self, now: u64) -> bool {
        self.age_ms(now) < CACHE_TTL_MS
    }

    /// Remaining freshness in milliseconds, `0` once stale.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        CACHE_TTL_MS.saturating_sub(self.age_ms(now))
    }

    // == Flat Encoding ==
    /// Encodes the entry as the JSON string stored in the flat backend.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes an entry from its flat-backend JSON string.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
