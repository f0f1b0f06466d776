//! Configuration for the semantic memory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use recall_embeddings::{DEFAULT_MAX_BATCH_SIZE, RetryPolicy};
use recall_index::DEFAULT_INDEX_KEY;

use crate::error::{Result, RetrievalError};

/// Top-level configuration, usually read from a TOML file.
///
/// ```toml
/// [storage]
/// root = "/var/lib/recall"
///
/// [embedding]
/// provider = "openai"
/// model = "text-embedding-3-small"
/// max_batch_size = 64
///
/// [search]
/// default_top_k = 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// Where the index document lives.
    pub storage: StorageConfig,

    /// Embedding provider configuration.
    pub embedding: EmbeddingConfig,

    /// Query defaults.
    pub search: SearchConfig,
}

impl RecallConfig {
    /// Create a configuration storing the index under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig {
                root: root.into(),
                ..StorageConfig::default()
            },
            ..Self::default()
        }
    }

    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RetrievalError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
            .map_err(|e| RetrievalError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| RetrievalError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the embedding configuration.
    pub fn with_embedding(mut self, config: EmbeddingConfig) -> Self {
        self.embedding = config;
        self
    }

    /// Set the search configuration.
    pub fn with_search(mut self, config: SearchConfig) -> Self {
        self.search = config;
        self
    }

    /// Reject values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.storage.index_key.trim().is_empty() {
            return Err(RetrievalError::Config(
                "storage.index_key must not be empty".to_string(),
            ));
        }
        if self.embedding.max_batch_size == 0 {
            return Err(RetrievalError::Config(
                "embedding.max_batch_size must be at least 1".to_string(),
            ));
        }
        if self.embedding.dimensions == Some(0) {
            return Err(RetrievalError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where and how the index document is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend.
    pub backend: StorageBackend,

    /// Directory holding the index document (filesystem backend).
    pub root: PathBuf,

    /// Key of the index document.
    pub index_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Fs,
            root: dirs::data_dir().unwrap_or_default().join("recall"),
            index_key: DEFAULT_INDEX_KEY.to_string(),
        }
    }
}

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per key under `root`.
    Fs,
    /// Process memory; nothing survives a restart.
    Memory,
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which provider to use.
    pub provider: EmbeddingProviderType,

    /// Model to request; the provider default when unset.
    pub model: Option<String>,

    /// Base URL for OpenAI-compatible endpoints.
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Output dimensions (shortened OpenAI vectors, or the hashing width).
    pub dimensions: Option<usize>,

    /// Maximum number of texts per provider call.
    pub max_batch_size: usize,

    /// Retries after the first attempt on transient failures.
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further retry.
    pub base_delay_ms: u64,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    /// Retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::OpenAI,
            model: None,
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            dimensions: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_retries: 3,
            base_delay_ms: 200,
            timeout_secs: 30,
        }
    }
}

/// Type of embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    /// OpenAI-compatible embeddings API.
    #[serde(rename = "openai")]
    OpenAI,
    /// Offline feature hashing.
    Hashing,
}

/// Configuration for query processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results returned when the caller does not ask for a count.
    pub default_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_top_k: 10 }
    }
}
