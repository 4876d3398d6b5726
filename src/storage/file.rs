//! File-backed document storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::storage::CacheStorage;

// == File Storage ==
/// Persists the cache document as a single JSON file.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    key: String,
}

impl FileStorage {
    /// Creates a storage backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key = format!("file:{}", path.display());
        Self { path, key }
    }

    /// Returns the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CacheStorage for FileStorage {
    fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache document {} not found, starting empty", self.path.display());
                Ok(None)
            }
            Err(e) => Err(CacheError::StorageRead(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, document: &str) -> Result<()> {
        let write_err =
            |e: std::io::Error| CacheError::StorageWrite(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, document).await.map_err(write_err)?;
        tokio::fs::rename(&temp, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}
