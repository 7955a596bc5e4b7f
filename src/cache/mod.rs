//! Cache Module
//!
//! Product list caching with consent gating, a fixed one-hour TTL and
//! transparent fallback from the structured store to the flat store.

mod clock;
mod entry;
mod product_cache;
mod selector;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{current_timestamp_ms, CacheEntry, CACHE_TTL_MS};
pub use product_cache::ProductCache;
pub use selector::{Backend, BackendSelector, ClearSummary, DEFAULT_OPEN_TIMEOUT};
pub use stats::{CacheStats, StatsRecorder};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Namespace for cache entries kept in the flat store
pub const FLAT_KEY_PREFIX: &str = "productcache:";

/// Flat store slot name for a cache key.
pub fn flat_key(key: &str) -> String {
    format!("{}{}", FLAT_KEY_PREFIX, key)
}
