//! Storage abstractions for crawl results.
//!
//! ```text
//! data/
//! ├── repositories-stars.json
//! ├── repositories-forks.json
//! ├── users-followers.json
//! └── users-repositories.json
//! ```

pub mod local;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Where the entities were written
    pub location: String,
    /// Number of entities written
    pub count: usize,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for result storage backends.
#[async_trait]
pub trait EntityStorage: Send + Sync {
    /// Replace the list stored under `name`.
    async fn write_entities<E>(&self, name: &Path, entities: &[E]) -> Result<WriteMetadata>
    where
        E: Serialize + Sync;

    /// Load the list stored under `name`, `None` if absent.
    async fn load_entities<E>(&self, name: &Path) -> Result<Option<Vec<E>>>
    where
        E: DeserializeOwned + Send;
}
