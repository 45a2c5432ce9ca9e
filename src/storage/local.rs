//! Local filesystem storage implementation.
//!
//! Result files are JSON arrays written atomically: the list goes to a
//! temporary sibling first and is renamed over the target, so a crash never
//! leaves a half-written result behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{EntityStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative name. Absolute names are kept as is.
    pub fn path(&self, name: &Path) -> PathBuf {
        self.root_dir.join(name)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, name: &Path, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(name);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, name: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl EntityStorage for LocalStorage {
    async fn write_entities<E>(&self, name: &Path, entities: &[E]) -> Result<WriteMetadata>
    where
        E: Serialize + Sync,
    {
        let mut bytes = serde_json::to_vec_pretty(entities)?;
        bytes.push(b'\n');
        let path = self.write_bytes(name, &bytes).await?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(WriteMetadata {
            location: path.display().to_string(),
            count: entities.len(),
            timestamp: Utc::now(),
        })
    }

    async fn load_entities<E>(&self, name: &Path) -> Result<Option<Vec<E>>>
    where
        E: DeserializeOwned + Send,
    {
        match self.read_bytes(name).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
