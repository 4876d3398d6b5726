//! Storage Module
//!
//! Persistence surface for the cache: one whole serialized document that is
//! loaded in full and overwritten in full.
//!
//! # Backends
//! - [`FileStorage`] - JSON file on disk, written atomically
//! - [`MemoryStorage`] - in-process document, for tests and embedding

mod file;
mod lock;
mod memory;

use async_trait::async_trait;

use crate::error::Result;

pub use file::FileStorage;
pub use lock::storage_lock;
pub use memory::MemoryStorage;

// == Cache Storage Trait ==
/// Whole-document persistence for the query cache.
#[async_trait]
pub trait CacheStorage: Send + Sync + std::fmt::Debug {
    /// Identifies the persisted document; operations on the same key are serialized.
    fn key(&self) -> &str;

    /// Reads the whole document. `Ok(None)` means nothing has been persisted yet.
    async fn load(&self) -> Result<Option<String>>;

    /// Replaces the whole document.
    async fn save(&self, document: &str) -> Result<()>;
}
