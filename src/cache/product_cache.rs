//! Product Cache Module
//!
//! The surface the storefront UI talks to. Checks consent, stamps and ages
//! entries, and hides every storage failure behind "cache miss".

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::cache::{
    Backend, BackendSelector, CacheEntry, CacheStats, ClearSummary, Clock, StatsRecorder,
    SystemClock,
};
use crate::config::Config;
use crate::consent::{ConsentManager, ConsentState};
use crate::error::Result;
use crate::storage::{
    DirectoryConnector, FileFlatStore, FlatStore, MemoryConnector, MemoryFlatStore,
    StoreConnector, UnavailableConnector,
};

const FLAT_STORE_FILE: &str = "flat_store.json";
const STRUCTURED_DIR: &str = "structured";

// == Product Cache ==
/// Consent-gated, expiring cache for product list responses.
///
/// Nothing here returns an error: when storage misbehaves the cache acts
/// as if caching were disabled, so product display never depends on it.
pub struct ProductCache {
    consent: ConsentManager,
    backends: BackendSelector,
    clock: Arc<dyn Clock>,
    stats: Arc<StatsRecorder>,
}

impl fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductCache")
            .field("backends", &self.backends)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl ProductCache {
    // == Constructors ==
    /// Creates a cache over `flat` (consent slots and fallback entries) and
    /// the structured store reachable through `connector`.
    pub fn new(flat: Arc<dyn FlatStore>, connector: Arc<dyn StoreConnector>) -> Self {
        let stats = Arc::new(StatsRecorder::new());
        Self {
            consent: ConsentManager::new(flat.clone()),
            backends: BackendSelector::new(connector, flat, stats.clone()),
            clock: Arc::new(SystemClock),
            stats,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Bounds the structured store open handshake.
    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.backends.set_open_timeout(timeout);
        self
    }

    /// Builds the stores described by `config`.
    ///
    /// With a data directory both stores are durable; without one they live
    /// in memory for the life of the process.
    pub fn from_config(config: &Config) -> Result<Self> {
        let flat: Arc<dyn FlatStore> = match &config.data_dir {
            Some(dir) => Arc::new(FileFlatStore::open(dir.join(FLAT_STORE_FILE))?),
            None => Arc::new(MemoryFlatStore::new()),
        };

        let connector: Arc<dyn StoreConnector> = match (&config.data_dir, config.structured_store)
        {
            (_, false) => Arc::new(UnavailableConnector),
            (Some(dir), true) => Arc::new(DirectoryConnector::new(dir.join(STRUCTURED_DIR))),
            (None, true) => Arc::new(MemoryConnector::new()),
        };

        Ok(Self::new(flat, connector).with_open_timeout(config.open_timeout()))
    }

    // == Consent ==
    /// True iff the user accepted caching.
    pub fn has_cache_permission(&self) -> bool {
        self.consent.has_permission()
    }

    /// The recorded decision, None if never asked.
    pub fn get_cache_permission(&self) -> Option<ConsentState> {
        self.consent.permission()
    }

    /// Whether the consent banner should be shown.
    pub fn should_show_permission_dialog(&self) -> bool {
        self.consent.should_prompt()
    }

    /// Read access to the consent slots.
    pub fn consent(&self) -> &ConsentManager {
        &self.consent
    }

    /// Records the user's decision. Rejecting purges every cached entry
    /// before this returns, even if the decision itself could not be saved.
    pub async fn set_cache_permission(&self, state: ConsentState) {
        if let Err(e) = self.consent.set_permission(state, self.clock.now_ms()) {
            error!("Error saving cache permission: {}", e);
        }

        if state == ConsentState::Rejected {
            let summary = self.clear_all_caches().await;
            info!("Cache consent rejected, purged {} entries", summary.total());
        }
    }

    // == Get ==
    /// Returns the cached payload for `key` if consent is granted and the
    /// entry is younger than the TTL. Stale entries are deleted.
    pub async fn get_cached_products(&self, key: &str) -> Option<Value> {
        if !self.consent.has_permission() {
            self.stats.record_miss();
            return None;
        }

        let Some(entry) = self.backends.read(key).await else {
            debug!("Cache miss: {}", key);
            self.stats.record_miss();
            return None;
        };

        if entry.is_fresh_at(self.clock.now_ms()) {
            debug!("Loaded from cache: {}", key);
            self.stats.record_hit();
            Some(entry.data)
        } else {
            debug!("Cache entry expired: {}", key);
            self.stats.record_expired();
            self.stats.record_miss();
            self.backends.remove(key).await;
            None
        }
    }

    // == Set ==
    /// Caches `data` under `key`, replacing any previous entry.
    ///
    /// Returns the backend that stored it; None when consent is missing or
    /// both backends refused the write.
    pub async fn set_cached_products(&self, key: &str, data: Value) -> Option<Backend> {
        if !self.consent.has_permission() {
            debug!("Caching not permitted, skipping write of '{}'", key);
            return None;
        }

        let entry = CacheEntry::new(key, data, self.clock.now_ms());
        let backend = self.backends.write(&entry).await;
        match backend {
            Some(backend) => {
                debug!("Cached '{}' in {} store", key, backend);
                self.stats.record_write();
            }
            None => self.stats.record_dropped_write(),
        }
        backend
    }

    // == Delete ==
    /// Removes `key` from whichever backend holds it.
    pub async fn delete_cached_products(&self, key: &str) {
        self.backends.remove(key).await;
    }

    /// Same as [`ProductCache::delete_cached_products`].
    pub async fn clear_cache(&self, key: &str) {
        self.delete_cached_products(key).await;
    }

    // == Clear ==
    /// Removes every cached entry from both backends. The consent decision
    /// is kept.
    pub async fn clear_all_caches(&self) -> ClearSummary {
        let summary = self.backends.clear_all().await;
        info!(
            "Cleared product caches: {} structured, {} flat",
            summary.structured_removed, summary.flat_removed
        );
        summary
    }

    /// Operator entry point for a manual purge.
    pub async fn clear_product_cache(&self) -> bool {
        self.clear_all_caches().await;
        info!("All product caches cleared successfully");
        true
    }

    // == Sweep ==
    /// Deletes every stored copy that has outlived the TTL, returning how
    /// many were removed. Reads never need this; it only reclaims space.
    pub async fn sweep_expired(&self) -> usize {
        let removed = self.backends.sweep_stale(self.clock.now_ms()).await;
        for _ in 0..removed {
            self.stats.record_expired();
        }
        removed
    }

    // == Introspection ==
    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Backend that new entries go to.
    pub async fn preferred_backend(&self) -> Backend {
        self.backends.preferred().await
    }
}
