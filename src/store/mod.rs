//! Persistence of the singleton record.
//!
//! There is exactly one stored record, identified by [`SINGLETON_ID`]. Every
//! successful scrape replaces it in full; readers see either the previous
//! record or the new one, never a mix.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, used by tests and `--store memory`
//! - [`JsonFileStore`]: one JSON document on disk, replaced atomically

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::models::ScrapedRecord;

pub mod json;

pub use json::JsonFileStore;

/// Fixed identity of the one stored record.
pub const SINGLETON_ID: &str = "mars";

/// Upsert/read access to the singleton record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Replace the stored record with `record`, creating it if absent.
    async fn upsert_singleton(&self, record: &ScrapedRecord) -> Result<(), StoreError>;

    /// The stored record, if a scrape has ever completed.
    async fn find_singleton(&self) -> Result<Option<ScrapedRecord>, StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RwLock<Option<ScrapedRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    #[instrument(level = "debug", skip_all)]
    async fn upsert_singleton(&self, record: &ScrapedRecord) -> Result<(), StoreError> {
        *self.record.write().await = Some(record.clone());
        debug!(id = SINGLETON_ID, "Replaced in-memory record");
        Ok(())
    }

    async fn find_singleton(&self) -> Result<Option<ScrapedRecord>, StoreError> {
        Ok(self.record.read().await.clone())
    }
}
