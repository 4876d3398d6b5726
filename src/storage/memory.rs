//! In-memory document storage.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CacheError, Result};
use crate::storage::CacheStorage;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

// == Memory Storage ==
/// Keeps the serialized document in memory.
///
/// Clones share the same document and key. Write failures can be switched on
/// to exercise degraded paths.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    key: String,
    document: Arc<RwLock<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Creates an empty storage with a unique key.
    pub fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            key: format!("memory:{}", id),
            document: Arc::new(RwLock::new(None)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a storage pre-seeded with raw document text.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let mut storage = Self::new();
        storage.document = Arc::new(RwLock::new(Some(contents.into())));
        storage
    }

    /// Returns the raw persisted document, if any.
    pub async fn contents(&self) -> Option<String> {
        self.document.read().await.clone()
    }

    /// Makes subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> Result<Option<String>> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::StorageWrite(format!("{} is read-only", self.key)));
        }
        *self.document.write().await = Some(document.to_string());
        Ok(())
    }
}
