//! Misbehaving backends for exercising the fallback paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{FlatStore, MemoryFlatStore, MemoryStore, StoreConnector, StructuredStore};
use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

fn refused() -> CacheError {
    CacheError::Storage("storage refused the operation".to_string())
}

/// Flat store whose every operation fails, like storage disabled by policy.
#[derive(Debug, Default)]
pub struct BrokenFlatStore;

impl FlatStore for BrokenFlatStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(refused())
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(refused())
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Err(refused())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Err(refused())
    }
}

/// Flat store that refuses writes to one slot and behaves normally otherwise.
#[derive(Debug)]
pub struct SlotRefusingFlatStore {
    inner: MemoryFlatStore,
    refused: &'static str,
}

impl SlotRefusingFlatStore {
    pub fn new(refused: &'static str) -> Self {
        Self {
            inner: MemoryFlatStore::new(),
            refused,
        }
    }
}

impl FlatStore for SlotRefusingFlatStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if key == self.refused {
            return Err(refused());
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.inner.remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}

/// Structured store wrapping a [`MemoryStore`] that can be switched to
/// fail every operation.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(refused())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StructuredStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        self.check()?;
        self.inner.put(entry).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn clear(&self) -> Result<usize> {
        self.check()?;
        self.inner.clear().await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.check()?;
        self.inner.keys().await
    }

    fn backend_name(&self) -> &str {
        "flaky"
    }
}

/// Connector returning a shared [`FlakyStore`].
#[derive(Debug, Default, Clone)]
pub struct FlakyConnector {
    pub store: Arc<FlakyStore>,
}

#[async_trait]
impl StoreConnector for FlakyConnector {
    async fn open(&self) -> Result<Arc<dyn StructuredStore>> {
        Ok(self.store.clone())
    }
}

/// Connector whose open handshake never completes.
#[derive(Debug, Default)]
pub struct HangingConnector;

#[async_trait]
impl StoreConnector for HangingConnector {
    async fn open(&self) -> Result<Arc<dyn StructuredStore>> {
        std::future::pending::<Result<Arc<dyn StructuredStore>>>().await
    }
}

/// Connector counting handshakes; each one takes a little while so
/// concurrent callers overlap.
#[derive(Debug, Default)]
pub struct CountingConnector {
    pub opens: AtomicUsize,
}

#[async_trait]
impl StoreConnector for CountingConnector {
    async fn open(&self) -> Result<Arc<dyn StructuredStore>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Arc::new(MemoryStore::new()))
    }
}
