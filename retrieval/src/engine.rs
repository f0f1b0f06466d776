//! Semantic memory: embed text, index it, and query it back.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use recall_embeddings::{
    EmbeddingProvider, HashingProvider, OpenAIProvider, RetryingBatchEmbedder, TextEmbedder,
};
use recall_index::{
    BlobStore, EmbeddingRecord, FsBlobStore, IndexStats, MemoryBlobStore, RecordMeta,
    SearchHit, SourceType, VectorIndexCache, VectorRecordStore,
};

use crate::config::{EmbeddingConfig, EmbeddingProviderType, RecallConfig, StorageBackend};
use crate::error::Result;

/// A text unit to remember.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    /// What produced the text.
    pub source_type: SourceType,

    /// Identifier of the originating entity.
    pub source_id: String,

    /// The text to embed.
    pub text: String,

    /// Node type hint stored in record metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    /// File backing the text, stored in record metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

impl TextItem {
    /// Create a new item.
    pub fn new(source_type: SourceType, source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_type,
            source_id: source_id.into(),
            text: text.into(),
            node_type: None,
            source_ref: None,
        }
    }

    /// Set the node type hint.
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Set the backing file reference.
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }
}

/// Embedder plus vector index behind one handle.
///
/// Construct once at startup and share; both halves are reference counted.
#[derive(Clone)]
pub struct SemanticMemory {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<VectorIndexCache>,
    default_top_k: usize,
}

impl SemanticMemory {
    /// Create a memory from existing parts.
    pub fn new(embedder: Arc<dyn TextEmbedder>, index: Arc<VectorIndexCache>) -> Self {
        Self {
            embedder,
            index,
            default_top_k: 10,
        }
    }

    /// Set how many results `recall` returns by default.
    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    /// Build a memory from configuration.
    pub async fn from_config(config: &RecallConfig) -> Result<Self> {
        config.validate()?;
        info!("Initializing semantic memory");

        let blob: Arc<dyn BlobStore> = match config.storage.backend {
            StorageBackend::Fs => Arc::new(FsBlobStore::new(&config.storage.root).await?),
            StorageBackend::Memory => Arc::new(MemoryBlobStore::new()),
        };
        let store = VectorRecordStore::with_key(blob, config.storage.index_key.clone());
        let index = Arc::new(VectorIndexCache::new(store));

        let embedder = build_embedder(&config.embedding);

        Ok(Self::new(embedder, index).with_default_top_k(config.search.default_top_k))
    }

    /// The embedder.
    pub fn embedder(&self) -> &Arc<dyn TextEmbedder> {
        &self.embedder
    }

    /// The vector index.
    pub fn index(&self) -> &Arc<VectorIndexCache> {
        &self.index
    }

    /// Embed and index one text unit.
    pub async fn remember(&self, item: TextItem) -> Result<EmbeddingRecord> {
        let vector = self.embedder.embed_one(&item.text).await?;
        let record = self.to_record(item, vector).await?;
        self.index.upsert(record.clone()).await?;

        debug!("Remembered {}:{}", record.source_type, record.source_id);
        Ok(record)
    }

    /// Embed and index several text units with one batched embedding pass and
    /// one index write.
    pub async fn remember_many(&self, items: Vec<TextItem>) -> Result<Vec<EmbeddingRecord>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = items.iter().map(|item| item.text.clone()).collect();
        let vectors = self.embedder.embed_many(&texts).await?;

        let mut records = Vec::with_capacity(items.len());
        for (item, vector) in items.into_iter().zip(vectors) {
            records.push(self.to_record(item, vector).await?);
        }

        self.index.upsert_many(records.clone()).await?;
        info!("Remembered {} text units", records.len());
        Ok(records)
    }

    /// Find the stored units most similar to `query`.
    pub async fn recall(&self, query: &str, top_k: Option<usize>) -> Result<Vec<SearchHit>> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        let vector = self.embedder.embed_one(query).await?;
        Ok(self.index.search(&vector, top_k).await?)
    }

    /// Drop the unit stored for `(source_type, source_id)`.
    pub async fn forget(&self, source_type: SourceType, source_id: &str) -> Result<bool> {
        Ok(self.index.remove_source(source_type, source_id).await?)
    }

    /// Index statistics.
    pub async fn stats(&self) -> Result<IndexStats> {
        Ok(self.index.stats().await?)
    }

    /// Wrap a vector into a record, reusing the id already assigned to the
    /// same source so ids stay stable across re-indexing.
    async fn to_record(&self, item: TextItem, vector: Vec<f32>) -> Result<EmbeddingRecord> {
        let snapshot = self.index.snapshot().await?;
        let existing_id = snapshot
            .entries()
            .iter()
            .find(|entry| entry.record.source_key() == (item.source_type, item.source_id.as_str()))
            .map(|entry| entry.record.id.clone());

        let mut meta = RecordMeta::for_model(self.embedder.model());
        meta.node_type = item.node_type;
        meta.source_ref = item.source_ref;

        let mut record = EmbeddingRecord::new(item.source_type, item.source_id, vector).with_meta(meta);
        if let Some(id) = existing_id {
            record.id = id;
        }
        Ok(record)
    }
}

/// Build the configured embedder.
pub fn build_embedder(config: &EmbeddingConfig) -> Arc<dyn TextEmbedder> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderType::OpenAI => {
            let mut provider = OpenAIProvider::from_env(&config.api_key_env)
                .with_timeout(Duration::from_secs(config.timeout_secs));
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            if let Some(model) = &config.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(dimensions) = config.dimensions {
                provider = provider.with_dimensions(dimensions);
            }
            Arc::new(provider)
        }
        EmbeddingProviderType::Hashing => Arc::new(HashingProvider::new(
            config.dimensions.unwrap_or(256),
        )),
    };

    let provider_name = provider.name().to_string();
    let mut embedder = RetryingBatchEmbedder::new(provider)
        .with_max_batch_size(config.max_batch_size)
        .with_retry_policy(config.retry_policy());
    if let Some(model) = &config.model {
        embedder = embedder.with_model(model.clone());
    }
    info!(
        "Using embedding provider {provider_name} with model {}",
        embedder.model()
    );

    Arc::new(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;
    use crate::error::RetrievalError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn hashing_config(root: &std::path::Path) -> RecallConfig {
        RecallConfig::new(root).with_embedding(EmbeddingConfig {
            provider: EmbeddingProviderType::Hashing,
            dimensions: Some(64),
            ..EmbeddingConfig::default()
        })
    }

    #[tokio::test]
    async fn test_remember_and_recall_with_hashing_provider() {
        let temp_dir = TempDir::new().unwrap();
        let memory = SemanticMemory::from_config(&hashing_config(temp_dir.path()))
            .await
            .unwrap();

        memory
            .remember_many(vec![
                TextItem::new(SourceType::KnowledgeNode, "rust", "rust borrow checker lifetimes"),
                TextItem::new(SourceType::KnowledgeNode, "bread", "sourdough bread baking"),
            ])
            .await
            .unwrap();

        let hits = memory.recall("borrow checker", Some(1)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.source_id, "rust");
        assert_eq!(
            hits[0].record.meta.as_ref().and_then(|m| m.model.as_deref()),
            Some("feature-hashing")
        );
    }

    #[tokio::test]
    async fn test_reindexing_keeps_record_id() {
        let temp_dir = TempDir::new().unwrap();
        let memory = SemanticMemory::from_config(&hashing_config(temp_dir.path()))
            .await
            .unwrap();

        let first = memory
            .remember(TextItem::new(SourceType::DocumentChunk, "doc#0", "first draft"))
            .await
            .unwrap();
        let second = memory
            .remember(
                TextItem::new(SourceType::DocumentChunk, "doc#0", "final version")
                    .with_source_ref("docs/doc.md"),
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let stats = memory.stats().await.unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.dimension, Some(64));
    }

    #[tokio::test]
    async fn test_forget() {
        let temp_dir = TempDir::new().unwrap();
        let memory = SemanticMemory::from_config(&hashing_config(temp_dir.path()))
            .await
            .unwrap();

        memory
            .remember(TextItem::new(SourceType::ConversationLog, "turn-1", "hello there"))
            .await
            .unwrap();

        assert!(memory.forget(SourceType::ConversationLog, "turn-1").await.unwrap());
        assert!(!memory.forget(SourceType::ConversationLog, "turn-1").await.unwrap());
        assert_eq!(memory.stats().await.unwrap().records, 0);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = hashing_config(temp_dir.path());
        config.embedding.max_batch_size = 0;

        let err = SemanticMemory::from_config(&config).await.err().unwrap();
        assert!(matches!(err, RetrievalError::Config(_)));
    }

    #[test]
    fn test_build_embedder_applies_model_override() {
        let embedder = build_embedder(&EmbeddingConfig {
            provider: EmbeddingProviderType::Hashing,
            model: Some("custom-hashing".to_string()),
            dimensions: Some(16),
            ..EmbeddingConfig::default()
        });
        assert_eq!(embedder.model(), "custom-hashing");
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let memory = SemanticMemory::from_config(&hashing_config(temp_dir.path()))
            .await
            .unwrap();

        let err = memory.recall("   ", None).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Embedding(_)));
    }
}
