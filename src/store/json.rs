//! JSON file backend for the singleton record.
//!
//! The record is written as a single document with its identity inlined:
//!
//! ```text
//! { "_id": "mars", "news_title": "...", ..., "hemisphere_images": [...] }
//! ```
//!
//! Upserts write a sibling `.tmp` file and rename it over the target, so a
//! reader never observes a half-written record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use super::{RecordStore, SINGLETON_ID};
use crate::error::StoreError;
use crate::models::ScrapedRecord;

#[derive(Serialize)]
struct StoredRef<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    #[serde(flatten)]
    record: &'a ScrapedRecord,
}

#[derive(Deserialize)]
struct Stored {
    #[serde(rename = "_id")]
    _id: String,
    #[serde(flatten)]
    record: ScrapedRecord,
}

/// Stores the record as one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| SINGLETON_ID.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn upsert_singleton(&self, record: &ScrapedRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&StoredRef {
            id: SINGLETON_ID,
            record,
        })?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir).await {
                error!(dir = %dir.display(), error = %e, "Failed to create store dir");
                return Err(e.into());
            }
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        info!(id = SINGLETON_ID, "Wrote record");
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    async fn find_singleton(&self) -> Result<Option<ScrapedRecord>, StoreError> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: Stored = serde_json::from_str(&json)?;
        Ok(Some(stored.record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::record;

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("mars.json"));
        assert!(store.find_singleton().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_creates_dirs_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("data").join("mars.json"));
        let rec = record("Roundtrip Mission");

        store.upsert_singleton(&rec).await.unwrap();

        assert_eq!(store.find_singleton().await.unwrap(), Some(rec));
        assert!(!store.tmp_path().exists());
    }

    #[tokio::test]
    async fn test_document_carries_fixed_id() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("mars.json"));
        store.upsert_singleton(&record("x")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["_id"], "mars");
        assert_eq!(value["news_title"], "x");
    }

    #[tokio::test]
    async fn test_upsert_overwrites_previous_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("mars.json"));
        store.upsert_singleton(&record("old")).await.unwrap();
        store.upsert_singleton(&record("new")).await.unwrap();

        let stored = store.find_singleton().await.unwrap().unwrap();
        assert_eq!(stored.news_title, "new");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_json_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mars.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(path).find_singleton().await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
