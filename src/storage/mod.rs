//! Storage Module
//!
//! The two physical backends the product cache can sit on:
//!
//! - **Flat store**: synchronous string-to-string slots. Always available,
//!   holds the consent flag and any cache entry the structured store could
//!   not take.
//! - **Structured store**: asynchronous record collection keyed by cache key.
//!   Preferred for cache entries; reached through a [`StoreConnector`] whose
//!   `open` handshake may fail.

mod flat;
mod structured;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::CacheEntry;
use crate::error::Result;

pub use flat::{FileFlatStore, MemoryFlatStore};
pub use structured::{
    DirectoryConnector, DirectoryStore, MemoryConnector, MemoryStore, UnavailableConnector,
    COLLECTION_NAME, SCHEMA_VERSION,
};
#[cfg(test)]
pub(crate) use structured::record_file_name;

// == Flat Store ==
/// Synchronous string key-value storage.
pub trait FlatStore: Send + Sync + Debug {
    /// Returns the stored string, None if the slot is empty.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value`, replacing whatever was there.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Empties the slot. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Lists every occupied slot name.
    fn keys(&self) -> Result<Vec<String>>;
}

// == Structured Store ==
/// Asynchronous record storage for cache entries, keyed by `CacheEntry::key`.
#[async_trait]
pub trait StructuredStore: Send + Sync + Debug {
    /// Fetches the record for `key`.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts or replaces the record for `entry.key`.
    async fn put(&self, entry: &CacheEntry) -> Result<()>;

    /// Removes the record for `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every record in the collection, returning how many were dropped.
    async fn clear(&self) -> Result<usize>;

    /// Lists every stored key.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Short name used in logs.
    fn backend_name(&self) -> &str;
}

// == Store Connector ==
/// Performs the open handshake for a structured store, including any
/// collection setup. Called at most once per cache.
#[async_trait]
pub trait StoreConnector: Send + Sync + Debug {
    async fn open(&self) -> Result<Arc<dyn StructuredStore>>;
}
