//! Structured store implementations and their connectors.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{StoreConnector, StructuredStore};
use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

/// Name of the collection holding product entries.
pub const COLLECTION_NAME: &str = "products";

/// Layout version written to the collection's schema marker.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_FILE: &str = "meta.json";
const RECORD_PREFIX: &str = "k";
const RECORD_EXT: &str = "json";

// == Memory Store ==
/// In-process structured store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StructuredStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        self.records
            .write()
            .await
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        let mut records = self.records.write().await;
        let count = records.len();
        records.clear();
        Ok(count)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.read().await.keys().cloned().collect())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

/// Connector handing out one shared [`MemoryStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store `open` will return.
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn open(&self) -> Result<Arc<dyn StructuredStore>> {
        Ok(self.store.clone())
    }
}

// == Directory Store ==
/// Structured store holding one JSON record file per key inside a
/// collection directory. Records are named by the SHA-256 digest of their
/// key, so any key string maps to a short, safe file name.
#[derive(Debug)]
pub struct DirectoryStore {
    collection: PathBuf,
}

impl DirectoryStore {
    fn record_path(&self, key: &str) -> PathBuf {
        self.collection.join(record_file_name(key))
    }

    /// Directory holding the records.
    pub fn collection_dir(&self) -> &Path {
        &self.collection
    }

    async fn record_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.collection).await?;
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            let is_record = path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT)
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(RECORD_PREFIX));
            if is_record {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl StructuredStore for DirectoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        match fs::read_to_string(self.record_path(key)).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        let path = self.record_path(&entry.key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(entry)?).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<usize> {
        let files = self.record_files().await?;
        for path in &files {
            match fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(files.len())
    }

    /// Keys are read back from the records themselves; unreadable records
    /// are skipped.
    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for path in self.record_files().await? {
            let contents = match fs::read_to_string(&path).await {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            match serde_json::from_str::<CacheEntry>(&contents) {
                Ok(entry) => keys.push(entry.key),
                Err(e) => debug!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }
        Ok(keys)
    }

    fn backend_name(&self) -> &str {
        "directory"
    }
}

/// Opens a [`DirectoryStore`] under `root`, creating the collection
/// directory and its schema marker on first use.
#[derive(Debug, Clone)]
pub struct DirectoryConnector {
    root: PathBuf,
}

impl DirectoryConnector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StoreConnector for DirectoryConnector {
    async fn open(&self) -> Result<Arc<dyn StructuredStore>> {
        let collection = self.root.join(COLLECTION_NAME);
        fs::create_dir_all(&collection).await?;

        let schema = collection.join(SCHEMA_FILE);
        match fs::read_to_string(&schema).await {
            Ok(contents) => {
                let meta: serde_json::Value = serde_json::from_str(&contents)?;
                if meta["version"] != SCHEMA_VERSION {
                    return Err(CacheError::Unavailable(format!(
                        "unsupported collection version {} in {}",
                        meta["version"],
                        schema.display()
                    )));
                }
                debug!("Reusing collection at {}", collection.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let meta = json!({ "collection": COLLECTION_NAME, "version": SCHEMA_VERSION });
                fs::write(&schema, serde_json::to_vec_pretty(&meta)?).await?;
                info!("Created collection at {}", collection.display());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Arc::new(DirectoryStore { collection }))
    }
}

// == Unavailable Connector ==
/// Connector for environments without a structured store.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableConnector;

#[async_trait]
impl StoreConnector for UnavailableConnector {
    async fn open(&self) -> Result<Arc<dyn StructuredStore>> {
        Err(CacheError::Unavailable(
            "structured store disabled".to_string(),
        ))
    }
}

// == Record Naming ==
pub(crate) fn record_file_name(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!(
        "{}{}.{}",
        RECORD_PREFIX,
        hex::encode(hasher.finalize()),
        RECORD_EXT
    )
}
