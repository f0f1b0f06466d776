//! Key → JSON document storage backends.
//!
//! The index persists itself as one document under one key. Backends offer
//! whole-document reads and overwrites only: no partial writes, no locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageError;

/// Result type for blob operations.
pub type BlobResult<T> = std::result::Result<T, StorageError>;

/// Whole-document JSON storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the document stored under `key`, or `None` if there is none.
    ///
    /// A stored payload that is not JSON at all is reported as
    /// [`StorageError::InvalidDocument`].
    async fn read(&self, key: &str) -> BlobResult<Option<Value>>;

    /// Store `value` under `key`, replacing whatever was there.
    async fn save(&self, key: &str, value: &Value) -> BlobResult<()>;
}

/// Stores each key as a pretty-printed JSON file under a root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> BlobResult<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::CreateDirectory(format!("{}: {e}", root.display())))?;

        Ok(Self { root })
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_name}.json"))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn read(&self, key: &str) -> BlobResult<Option<Value>> {
        let path = self.path_for(key);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFile(format!("{}: {e}", path.display())));
            }
        };

        let value = serde_json::from_str(&content)
            .map_err(|e| StorageError::InvalidDocument(format!("{}: {e}", path.display())))?;

        debug!("Read blob {key} from {}", path.display());
        Ok(Some(value))
    }

    async fn save(&self, key: &str, value: &Value) -> BlobResult<()> {
        let path = self.path_for(key);
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", path.display())))?;

        // Write atomically using a temp file
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", temp_path.display())))?;

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", path.display())))?;

        debug!("Saved blob {key} to {}", path.display());
        Ok(())
    }
}

/// Keeps documents in process memory.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Value>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, key: &str) -> BlobResult<Option<Value>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &Value) -> BlobResult<()> {
        self.blobs
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}
