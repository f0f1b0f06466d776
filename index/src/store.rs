//! Whole-document persistence of the vector index.
//!
//! The `VectorRecordStore` reads and writes the complete [`VectorIndexFile`]
//! under a single blob key. A document whose outer shape is broken is fatal;
//! individual broken records are dropped with a warning so one bad entry
//! never takes the rest of the index down with it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::blob::BlobStore;
use crate::error::{IndexError, Result, StorageError};
use crate::record::{EmbeddingRecord, VectorIndexFile};

/// Default blob key holding the index document.
pub const DEFAULT_INDEX_KEY: &str = "vector-index";

/// Outer shape of the stored document; records are checked one by one later.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIndexFile {
    schema_version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    records: Vec<Value>,
}

/// Reads and writes the index document through a [`BlobStore`].
#[derive(Clone)]
pub struct VectorRecordStore {
    blob: Arc<dyn BlobStore>,
    key: String,
}

impl VectorRecordStore {
    /// Create a store using [`DEFAULT_INDEX_KEY`].
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self::with_key(blob, DEFAULT_INDEX_KEY)
    }

    /// Create a store using a custom key.
    pub fn with_key(blob: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            blob,
            key: key.into(),
        }
    }

    /// Blob key of the index document.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the index document, or `None` if nothing has been stored yet.
    pub async fn load(&self) -> Result<Option<VectorIndexFile>> {
        let value = match self.blob.read(&self.key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("No index document stored under {}", self.key);
                return Ok(None);
            }
            Err(StorageError::InvalidDocument(message)) => {
                return Err(IndexError::CorruptIndex(message));
            }
            Err(e) => return Err(e.into()),
        };

        let raw: RawIndexFile = serde_json::from_value(value)
            .map_err(|e| IndexError::CorruptIndex(format!("{}: {e}", self.key)))?;

        let total = raw.records.len();
        let records = sanitize_records(raw.records);
        if records.len() < total {
            warn!(
                "Dropped {} of {total} records while loading {}",
                total - records.len(),
                self.key
            );
        }

        info!("Loaded {} vector records from {}", records.len(), self.key);

        Ok(Some(VectorIndexFile {
            schema_version: raw.schema_version,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            records,
        }))
    }

    /// Stamp `updatedAt` and overwrite the stored document with `file`.
    pub async fn save(&self, file: &mut VectorIndexFile) -> Result<()> {
        file.updated_at = Utc::now();
        let value = serde_json::to_value(&*file)?;
        self.blob.save(&self.key, &value).await?;

        debug!(
            "Saved {} vector records to {}",
            file.records.len(),
            self.key
        );
        Ok(())
    }
}

/// Keep every record that parses, validates, matches the dimension of the
/// first kept record, and does not repeat an earlier identity.
fn sanitize_records(values: Vec<Value>) -> Vec<EmbeddingRecord> {
    let mut records: Vec<EmbeddingRecord> = Vec::with_capacity(values.len());
    let mut ids = HashSet::new();
    let mut source_keys = HashSet::new();

    for (position, value) in values.into_iter().enumerate() {
        let record: EmbeddingRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!("Dropping malformed vector record at position {position}: {e}");
                continue;
            }
        };

        if let Err(e) = record.validate() {
            warn!("Dropping invalid vector record at position {position}: {e}");
            continue;
        }

        let index_dimension = records.first().map(EmbeddingRecord::dimension);
        if let Some(expected) = index_dimension.filter(|d| *d != record.dimension()) {
            warn!(
                "Dropping vector record {} at position {position}: dimension {} does not match index dimension {expected}",
                record.id,
                record.dimension()
            );
            continue;
        }

        if ids.contains(&record.id)
            || source_keys.contains(&(record.source_type, record.source_id.clone()))
        {
            warn!(
                "Dropping duplicate vector record {} ({}:{}) at position {position}",
                record.id, record.source_type, record.source_id
            );
            continue;
        }

        ids.insert(record.id.clone());
        source_keys.insert((record.source_type, record.source_id.clone()));
        records.push(record);
    }

    records
}
