//! Backend Selector Module
//!
//! Presents one get/put/delete/clear surface over the structured store and
//! the flat store. The structured store is opened lazily, once, and used
//! first; any failure on it sends that single operation to the flat store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::cache::{flat_key, CacheEntry, StatsRecorder, FLAT_KEY_PREFIX};
use crate::error::CacheError;
use crate::storage::{FlatStore, StoreConnector, StructuredStore};

/// Default bound on the structured store open handshake.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

// == Backend ==
/// Which physical backend served an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Structured,
    Flat,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Structured => f.write_str("structured"),
            Backend::Flat => f.write_str("flat"),
        }
    }
}

// == Clear Summary ==
/// Entries removed by a bulk clear, per backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearSummary {
    pub structured_removed: usize,
    pub flat_removed: usize,
}

impl ClearSummary {
    pub fn total(&self) -> usize {
        self.structured_removed + self.flat_removed
    }
}

// == Backend Selector ==
pub struct BackendSelector {
    connector: Arc<dyn StoreConnector>,
    flat: Arc<dyn FlatStore>,
    /// Outcome of the one open handshake: Some(store), or None for "flat only"
    handle: OnceCell<Option<Arc<dyn StructuredStore>>>,
    open_timeout: Duration,
    stats: Arc<StatsRecorder>,
}

impl fmt::Debug for BackendSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSelector")
            .field("connector", &self.connector)
            .field("flat", &self.flat)
            .field("initialized", &self.handle.initialized())
            .field("open_timeout", &self.open_timeout)
            .finish()
    }
}

impl BackendSelector {
    pub fn new(
        connector: Arc<dyn StoreConnector>,
        flat: Arc<dyn FlatStore>,
        stats: Arc<StatsRecorder>,
    ) -> Self {
        Self {
            connector,
            flat,
            handle: OnceCell::new(),
            open_timeout: DEFAULT_OPEN_TIMEOUT,
            stats,
        }
    }

    /// Sets the open handshake bound. Only meaningful before first use.
    pub fn set_open_timeout(&mut self, timeout: Duration) {
        self.open_timeout = timeout;
    }

    // == Initialize ==
    /// Opens the structured store on first call and memoizes the outcome.
    ///
    /// Concurrent first callers share one handshake. A failed or timed out
    /// open resolves to None, after which every operation uses the flat store.
    pub async fn initialize(&self) -> Option<Arc<dyn StructuredStore>> {
        self.handle
            .get_or_init(|| async {
                match tokio::time::timeout(self.open_timeout, self.connector.open()).await {
                    Ok(Ok(store)) => {
                        info!("Structured store '{}' opened", store.backend_name());
                        Some(store)
                    }
                    Ok(Err(e)) => {
                        warn!("Structured store unavailable, using flat store: {}", e);
                        None
                    }
                    Err(_) => {
                        let e = CacheError::Timeout(format!(
                            "structured store open exceeded {:?}",
                            self.open_timeout
                        ));
                        warn!("Structured store unavailable, using flat store: {}", e);
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Backend that new writes will go to.
    pub async fn preferred(&self) -> Backend {
        match self.initialize().await {
            Some(_) => Backend::Structured,
            None => Backend::Flat,
        }
    }

    // == Read ==
    /// Looks `key` up in both backends and returns the most recent write.
    ///
    /// A write that fell back to the flat store stays visible after the
    /// structured store recovers, and an older structured copy never shadows it.
    pub async fn read(&self, key: &str) -> Option<CacheEntry> {
        let structured = match self.initialize().await {
            Some(store) => match store.get(key).await {
                Ok(found) => found,
                Err(CacheError::Malformed(e)) => {
                    warn!("Dropping malformed structured entry '{}': {}", key, e);
                    if let Err(e) = store.delete(key).await {
                        debug!("Could not drop malformed entry '{}': {}", key, e);
                    }
                    None
                }
                Err(e) => {
                    warn!("Structured read of '{}' failed, using flat store: {}", key, e);
                    self.stats.record_fallback();
                    None
                }
            },
            None => None,
        };

        let flat = self.read_flat(key);

        match (structured, flat) {
            (Some(s), Some(f)) => Some(if f.timestamp > s.timestamp { f } else { s }),
            (s, f) => s.or(f),
        }
    }

    fn read_flat(&self, key: &str) -> Option<CacheEntry> {
        let slot = flat_key(key);
        let raw = match self.flat.get_item(&slot) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Flat read of '{}' failed: {}", key, e);
                return None;
            }
        };

        match CacheEntry::from_json(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Dropping malformed flat entry '{}': {}", key, e);
                if let Err(e) = self.flat.remove_item(&slot) {
                    debug!("Could not drop malformed entry '{}': {}", key, e);
                }
                None
            }
        }
    }

    // == Write ==
    /// Stores `entry`, preferring the structured store.
    ///
    /// Returns the backend that took the write, or None when both failed.
    pub async fn write(&self, entry: &CacheEntry) -> Option<Backend> {
        if let Some(store) = self.initialize().await {
            match store.put(entry).await {
                Ok(()) => {
                    // A flat copy from an earlier fallback is now superseded
                    if let Err(e) = self.flat.remove_item(&flat_key(&entry.key)) {
                        debug!("Could not drop flat copy of '{}': {}", entry.key, e);
                    }
                    return Some(Backend::Structured);
                }
                Err(e) => {
                    warn!(
                        "Structured write of '{}' failed, using flat store: {}",
                        entry.key, e
                    );
                    self.stats.record_fallback();
                }
            }
        }

        let written = entry
            .to_json()
            .and_then(|raw| self.flat.set_item(&flat_key(&entry.key), &raw));
        match written {
            Ok(()) => Some(Backend::Flat),
            Err(e) => {
                warn!("Flat write of '{}' failed, dropping it: {}", entry.key, e);
                None
            }
        }
    }

    // == Remove ==
    /// Deletes `key` from both backends. Failures are logged and ignored.
    pub async fn remove(&self, key: &str) {
        if let Some(store) = self.initialize().await {
            if let Err(e) = store.delete(key).await {
                warn!("Structured delete of '{}' failed: {}", key, e);
            }
        }
        if let Err(e) = self.flat.remove_item(&flat_key(key)) {
            warn!("Flat delete of '{}' failed: {}", key, e);
        }
    }

    // == Clear All ==
    /// Empties the structured collection and every namespaced flat slot.
    pub async fn clear_all(&self) -> ClearSummary {
        let mut summary = ClearSummary::default();

        if let Some(store) = self.initialize().await {
            match store.clear().await {
                Ok(count) => summary.structured_removed = count,
                Err(e) => warn!("Structured clear failed: {}", e),
            }
        }

        match self.flat.keys() {
            Ok(keys) => {
                for slot in keys.iter().filter(|k| k.starts_with(FLAT_KEY_PREFIX)) {
                    match self.flat.remove_item(slot) {
                        Ok(()) => summary.flat_removed += 1,
                        Err(e) => warn!("Flat delete of '{}' failed: {}", slot, e),
                    }
                }
            }
            Err(e) => warn!("Could not list flat store keys: {}", e),
        }

        summary
    }

    // == Keys ==
    /// Every cache key held by either backend, deduplicated.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();

        if let Some(store) = self.initialize().await {
            match store.keys().await {
                Ok(found) => keys.extend(found),
                Err(e) => warn!("Could not list structured keys: {}", e),
            }
        }

        match self.flat.keys() {
            Ok(slots) => keys.extend(
                slots
                    .iter()
                    .filter_map(|s| s.strip_prefix(FLAT_KEY_PREFIX))
                    .map(str::to_string),
            ),
            Err(e) => warn!("Could not list flat store keys: {}", e),
        }

        keys.sort();
        keys.dedup();
        keys
    }

    // == Sweep ==
    /// Deletes every copy that has outlived the TTL at `now`, looking at each
    /// backend separately so a fresh copy in one never shields a stale copy
    /// in the other. Unreadable copies are removed too. Returns the number of
    /// copies removed.
    pub async fn sweep_stale(&self, now: u64) -> usize {
        let mut removed = 0;

        if let Some(store) = self.initialize().await {
            match store.keys().await {
                Ok(keys) => {
                    for key in keys {
                        let stale = match store.get(&key).await {
                            Ok(Some(entry)) => !entry.is_fresh_at(now),
                            Ok(None) => false,
                            Err(CacheError::Malformed(_)) => true,
                            Err(e) => {
                                warn!("Structured read of '{}' failed during sweep: {}", key, e);
                                false
                            }
                        };
                        if stale {
                            match store.delete(&key).await {
                                Ok(()) => removed += 1,
                                Err(e) => warn!("Structured delete of '{}' failed: {}", key, e),
                            }
                        }
                    }
                }
                Err(e) => warn!("Could not list structured keys: {}", e),
            }
        }

        match self.flat.keys() {
            Ok(slots) => {
                for slot in slots.iter().filter(|k| k.starts_with(FLAT_KEY_PREFIX)) {
                    let stale = match self.flat.get_item(slot) {
                        Ok(Some(raw)) => CacheEntry::from_json(&raw)
                            .map_or(true, |entry| !entry.is_fresh_at(now)),
                        Ok(None) => false,
                        Err(e) => {
                            warn!("Flat read of '{}' failed during sweep: {}", slot, e);
                            false
                        }
                    };
                    if stale {
                        match self.flat.remove_item(slot) {
                            Ok(()) => removed += 1,
                            Err(e) => warn!("Flat delete of '{}' failed: {}", slot, e),
                        }
                    }
                }
            }
            Err(e) => warn!("Could not list flat store keys: {}", e),
        }

        removed
    }
}
