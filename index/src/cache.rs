//! In-memory vector index backed by a [`VectorRecordStore`].
//!
//! The `VectorIndexCache` is the only way callers touch index state. It loads
//! lazily on first use, keeps an immutable [`IndexSnapshot`] of validated
//! records with their precomputed norms, and reconciles the snapshot with the
//! persisted document on every mutation:
//!
//! 1. take the write gate (one mutation at a time, across every await point),
//! 2. compute the new full record list from the current snapshot,
//! 3. persist the whole document,
//! 4. only then swap in a new snapshot.
//!
//! A failed write therefore leaves the previous snapshot in place, and two
//! concurrent upserts cannot both start from the same stale list. Searches
//! clone the current `Arc<IndexSnapshot>` and rank without holding a lock.
//!
//! Every mutation rewrites the entire document, so write cost grows linearly
//! with the index. `upsert_many` amortizes that for batches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use recall_embeddings::{l2_norm, rank_top_k};

use crate::error::{IndexError, Result};
use crate::record::{
    EmbeddingRecord, SCHEMA_VERSION, SourceType, VectorIndexFile, validate_record_set,
};
use crate::store::VectorRecordStore;

/// A validated record paired with its Euclidean norm.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEmbedding {
    /// The record.
    pub record: EmbeddingRecord,

    /// Precomputed `||record.vector||`; 0 for an all-zero vector.
    pub norm: f32,
}

impl CachedEmbedding {
    /// Wrap a record, computing its norm.
    pub fn new(record: EmbeddingRecord) -> Self {
        let norm = l2_norm(&record.vector);
        Self { record, norm }
    }
}

/// A search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matching record.
    pub record: EmbeddingRecord,

    /// Cosine similarity to the query.
    pub score: f32,
}

/// Result of upserting one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// No record shared the identity; the record was appended.
    Inserted,
    /// An existing record was replaced in place.
    Replaced,
}

/// Summary of the current index state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of records.
    pub records: usize,

    /// Index dimension, once a record exists.
    pub dimension: Option<usize>,

    /// Document schema version.
    pub schema_version: u32,

    /// When the index was initialized.
    pub created_at: DateTime<Utc>,

    /// When the index was last written.
    pub updated_at: DateTime<Utc>,
}

/// Immutable view of the index at one point in time.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    schema_version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    entries: Vec<CachedEmbedding>,
}

impl IndexSnapshot {
    fn from_file(file: VectorIndexFile) -> Self {
        Self {
            schema_version: file.schema_version,
            created_at: file.created_at,
            updated_at: file.updated_at,
            entries: file.records.into_iter().map(CachedEmbedding::new).collect(),
        }
    }

    /// Cached entries in insertion order.
    pub fn entries(&self) -> &[CachedEmbedding] {
        &self.entries
    }

    /// Cloned records in insertion order.
    pub fn records(&self) -> Vec<EmbeddingRecord> {
        self.entries.iter().map(|e| e.record.clone()).collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The index dimension: the vector length of the first entry.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.record.dimension())
    }

    /// Summary statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.len(),
            dimension: self.dimension(),
            schema_version: self.schema_version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Rank entries by cosine similarity to `query`, returning at most `top_k`.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if query.is_empty() {
            return Err(IndexError::Validation(
                "query vector must not be empty".to_string(),
            ));
        }
        if let Some(position) = query.iter().position(|v| !v.is_finite()) {
            return Err(IndexError::Validation(format!(
                "query vector has a non-finite value at position {position}"
            )));
        }

        let query_norm = l2_norm(query);
        if query_norm == 0.0 {
            return Err(IndexError::Validation(
                "query vector has zero norm; cosine similarity is undefined".to_string(),
            ));
        }

        let Some(dimension) = self.dimension() else {
            debug!("Search on empty index");
            return Ok(Vec::new());
        };

        if query.len() != dimension {
            return Err(IndexError::Validation(format!(
                "query dimension {} does not match index dimension {dimension}",
                query.len()
            )));
        }

        let candidates = self
            .entries
            .iter()
            .map(|e| (e.record.vector.as_slice(), e.norm));

        let hits = rank_top_k(query, query_norm, candidates, top_k)
            .into_iter()
            .map(|ranked| SearchHit {
                record: self.entries[ranked.position].record.clone(),
                score: ranked.score,
            })
            .collect::<Vec<_>>();

        debug!(
            "Search over {} entries returned {} hits",
            self.entries.len(),
            hits.len()
        );
        Ok(hits)
    }
}

/// Process-lifetime cache of the vector index.
///
/// Construct one per index at startup and share it behind an `Arc`.
pub struct VectorIndexCache {
    store: VectorRecordStore,
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
    write_gate: Mutex<()>,
}

impl VectorIndexCache {
    /// Create an unloaded cache over `store`.
    pub fn new(store: VectorRecordStore) -> Self {
        Self {
            store,
            snapshot: RwLock::new(None),
            write_gate: Mutex::new(()),
        }
    }

    /// Whether the cache has been populated.
    pub async fn is_loaded(&self) -> bool {
        self.snapshot.read().await.is_some()
    }

    /// Populate the cache if it is not yet loaded.
    ///
    /// When nothing is stored yet, an empty document is persisted first so
    /// storage and cache agree from the very first touch.
    pub async fn ensure_loaded(&self) -> Result<()> {
        self.snapshot().await.map(|_| ())
    }

    /// Current snapshot, loading it on first use.
    pub async fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let _gate = self.write_gate.lock().await;
        self.load_locked().await
    }

    /// All records in insertion order.
    pub async fn load(&self) -> Result<Vec<EmbeddingRecord>> {
        Ok(self.snapshot().await?.records())
    }

    /// Index dimension, if any record exists.
    pub async fn dimension(&self) -> Result<Option<usize>> {
        Ok(self.snapshot().await?.dimension())
    }

    /// Summary statistics.
    pub async fn stats(&self) -> Result<IndexStats> {
        Ok(self.snapshot().await?.stats())
    }

    /// Replace the whole index with `records`.
    ///
    /// Every record is validated before anything is written; the cache only
    /// changes after the document has been persisted.
    pub async fn replace_all(&self, records: Vec<EmbeddingRecord>) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let current = self.load_locked().await?;
        self.persist_and_swap(&current, records).await?;
        Ok(())
    }

    /// Insert `record`, or replace the entry sharing its `id` or
    /// `(sourceType, sourceId)`.
    pub async fn upsert(&self, record: EmbeddingRecord) -> Result<UpsertOutcome> {
        record.validate().map_err(IndexError::Validation)?;

        let _gate = self.write_gate.lock().await;
        let current = self.load_locked().await?;

        let mut records = current.records();
        let outcome = merge_record(&mut records, record);
        self.persist_and_swap(&current, records).await?;

        Ok(outcome)
    }

    /// Upsert several records with a single document rewrite.
    pub async fn upsert_many(&self, incoming: Vec<EmbeddingRecord>) -> Result<Vec<UpsertOutcome>> {
        for (position, record) in incoming.iter().enumerate() {
            record
                .validate()
                .map_err(|e| IndexError::Validation(format!("record at position {position}: {e}")))?;
        }

        if incoming.is_empty() {
            return Ok(Vec::new());
        }

        let _gate = self.write_gate.lock().await;
        let current = self.load_locked().await?;

        let mut records = current.records();
        let outcomes = incoming
            .into_iter()
            .map(|record| merge_record(&mut records, record))
            .collect();
        self.persist_and_swap(&current, records).await?;

        Ok(outcomes)
    }

    /// Remove every record matching `predicate`; returns how many were removed.
    pub async fn remove_where<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&EmbeddingRecord) -> bool + Send,
    {
        let _gate = self.write_gate.lock().await;
        let current = self.load_locked().await?;

        let mut records = current.records();
        let before = records.len();
        records.retain(|record| !predicate(record));
        let removed = before - records.len();

        if removed > 0 {
            self.persist_and_swap(&current, records).await?;
            info!("Removed {removed} vector records");
        }

        Ok(removed)
    }

    /// Remove the record with `id`.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.remove_where(|record| record.id == id).await? > 0)
    }

    /// Remove the record for `(source_type, source_id)`.
    pub async fn remove_source(&self, source_type: SourceType, source_id: &str) -> Result<bool> {
        let removed = self
            .remove_where(|record| record.source_key() == (source_type, source_id))
            .await?;
        Ok(removed > 0)
    }

    /// Rank cached records by cosine similarity to `query`.
    pub async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        self.snapshot().await?.search(query, top_k)
    }

    /// Load into the cache. Callers must hold the write gate.
    async fn load_locked(&self) -> Result<Arc<IndexSnapshot>> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let file = match self.store.load().await? {
            Some(file) => file,
            None => {
                info!("Initializing empty vector index under {}", self.store.key());
                let mut file = VectorIndexFile::empty();
                self.store.save(&mut file).await?;
                file
            }
        };

        let snapshot = Arc::new(IndexSnapshot::from_file(file));
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));

        debug!("Vector index cache loaded with {} entries", snapshot.len());
        Ok(snapshot)
    }

    /// Validate, persist, then swap. Callers must hold the write gate.
    async fn persist_and_swap(
        &self,
        current: &IndexSnapshot,
        records: Vec<EmbeddingRecord>,
    ) -> Result<Arc<IndexSnapshot>> {
        validate_record_set(&records).map_err(IndexError::Validation)?;

        let now = Utc::now();
        let mut file = VectorIndexFile {
            schema_version: SCHEMA_VERSION,
            created_at: current.created_at,
            updated_at: now,
            records,
        };
        self.store.save(&mut file).await?;

        let snapshot = Arc::new(IndexSnapshot::from_file(file));
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));

        debug!("Vector index now holds {} entries", snapshot.len());
        Ok(snapshot)
    }
}

/// Merge `incoming` into `records` by identity.
///
/// The first entry sharing `id` or `(sourceType, sourceId)` is replaced in
/// place; any later entries colliding with `incoming` are dropped.
fn merge_record(records: &mut Vec<EmbeddingRecord>, incoming: EmbeddingRecord) -> UpsertOutcome {
    let Some(position) = records.iter().position(|r| r.same_identity(&incoming)) else {
        records.push(incoming);
        return UpsertOutcome::Inserted;
    };

    let before = records.len();
    let mut index = 0;
    records.retain(|record| {
        let keep = index == position || !record.same_identity(&incoming);
        index += 1;
        keep
    });

    if records.len() < before {
        warn!(
            "Upsert of {} ({}:{}) also displaced {} conflicting records",
            incoming.id,
            incoming.source_type,
            incoming.source_id,
            before - records.len()
        );
    }

    records[position] = incoming;
    UpsertOutcome::Replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{BlobResult, BlobStore, MemoryBlobStore};
    use crate::error::StorageError;
    use crate::store::DEFAULT_INDEX_KEY;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn record(id: &str, source_id: &str, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord::new(SourceType::KnowledgeNode, source_id, vector).with_id(id)
    }

    fn memory_cache() -> (Arc<MemoryBlobStore>, VectorIndexCache) {
        let blob = Arc::new(MemoryBlobStore::new());
        let cache = VectorIndexCache::new(VectorRecordStore::new(blob.clone()));
        (blob, cache)
    }

    /// Memory store whose writes can be switched off, counting every save.
    /// Every save yields first so concurrent writers interleave.
    #[derive(Default)]
    struct FlakyBlobStore {
        inner: MemoryBlobStore,
        fail_writes: AtomicBool,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl BlobStore for FlakyBlobStore {
        async fn read(&self, key: &str) -> BlobResult<Option<serde_json::Value>> {
            self.inner.read(key).await
        }

        async fn save(&self, key: &str, value: &serde_json::Value) -> BlobResult<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("disk full".to_string()));
            }
            self.inner.save(key, value).await
        }
    }

    #[tokio::test]
    async fn test_first_touch_persists_empty_index() {
        let (blob, cache) = memory_cache();
        assert!(!cache.is_loaded().await);

        assert!(cache.load().await.unwrap().is_empty());
        assert!(cache.is_loaded().await);

        let stored = blob.read(DEFAULT_INDEX_KEY).await.unwrap().unwrap();
        assert_eq!(stored["records"], serde_json::json!([]));
        assert_eq!(stored["schemaVersion"], 1);
    }

    #[tokio::test]
    async fn test_replace_all_round_trip() {
        let (blob, cache) = memory_cache();
        let records = vec![
            record("a", "1", vec![1.0, 0.0]),
            record("b", "2", vec![0.0, 1.0]),
            record("c", "3", vec![0.6, 0.8]),
        ];

        cache.replace_all(records.clone()).await.unwrap();
        assert_eq!(cache.load().await.unwrap(), records);

        // A fresh cache over the same storage sees the same records.
        let reloaded = VectorIndexCache::new(VectorRecordStore::new(blob));
        assert_eq!(reloaded.load().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_replace_all_keeps_created_at() {
        let (_blob, cache) = memory_cache();
        let created = cache.stats().await.unwrap().created_at;

        cache
            .replace_all(vec![record("a", "1", vec![1.0])])
            .await
            .unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.created_at, created);
        assert!(stats.updated_at >= created);
        assert_eq!(stats.dimension, Some(1));
    }

    #[tokio::test]
    async fn test_replace_all_rejects_invalid_set_without_writing() {
        let (_blob, cache) = memory_cache();
        cache
            .replace_all(vec![record("a", "1", vec![1.0, 0.0])])
            .await
            .unwrap();

        let err = cache
            .replace_all(vec![
                record("x", "1", vec![1.0, 0.0]),
                record("y", "2", vec![f32::NAN, 0.0]),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, IndexError::Validation(_)));
        let ids: Vec<String> = cache.load().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_upsert_same_id_twice_keeps_one() {
        let (_blob, cache) = memory_cache();

        let first = cache.upsert(record("a", "1", vec![1.0, 0.0])).await.unwrap();
        let second = cache.upsert(record("a", "1", vec![0.0, 1.0])).await.unwrap();

        assert_eq!(first, UpsertOutcome::Inserted);
        assert_eq!(second, UpsertOutcome::Replaced);

        let records = cache.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vector, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_upsert_matches_source_key_in_place() {
        let (_blob, cache) = memory_cache();
        cache
            .replace_all(vec![
                record("a", "1", vec![1.0, 0.0]),
                record("b", "2", vec![0.0, 1.0]),
                record("c", "3", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let outcome = cache.upsert(record("new-id", "2", vec![0.5, 0.5])).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Replaced);

        let ids: Vec<String> = cache.load().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "new-id", "c"]);
    }

    #[tokio::test]
    async fn test_upsert_drops_second_colliding_entry() {
        let (_blob, cache) = memory_cache();
        cache
            .replace_all(vec![
                record("a", "1", vec![1.0]),
                record("b", "2", vec![1.0]),
            ])
            .await
            .unwrap();

        // Same id as "a", same source as "b".
        cache.upsert(record("a", "2", vec![2.0])).await.unwrap();

        let records = cache.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].source_id, "2");
    }

    #[tokio::test]
    async fn test_upsert_rejects_dimension_change() {
        let (_blob, cache) = memory_cache();
        cache.upsert(record("a", "1", vec![1.0, 0.0])).await.unwrap();

        let err = cache
            .upsert(record("b", "2", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Validation(_)));
        assert_eq!(cache.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_many_writes_once() {
        let blob = Arc::new(FlakyBlobStore::default());
        let cache = VectorIndexCache::new(VectorRecordStore::new(blob.clone()));
        cache.ensure_loaded().await.unwrap();
        let saves_after_init = blob.saves.load(Ordering::SeqCst);

        let outcomes = cache
            .upsert_many(vec![
                record("a", "1", vec![1.0]),
                record("b", "2", vec![2.0]),
                record("a", "1", vec![3.0]),
            ])
            .await
            .unwrap();

        assert_eq!(
            outcomes,
            vec![
                UpsertOutcome::Inserted,
                UpsertOutcome::Inserted,
                UpsertOutcome::Replaced
            ]
        );
        assert_eq!(blob.saves.load(Ordering::SeqCst), saves_after_init + 1);
        assert_eq!(cache.load().await.unwrap()[0].vector, vec![3.0]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_cache() {
        let blob = Arc::new(FlakyBlobStore::default());
        let cache = VectorIndexCache::new(VectorRecordStore::new(blob.clone()));
        cache.upsert(record("a", "1", vec![1.0, 0.0])).await.unwrap();

        blob.fail_writes.store(true, Ordering::SeqCst);
        let err = cache
            .upsert(record("b", "2", vec![0.0, 1.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Storage(_)));

        let records = cache.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_do_not_lose_updates() {
        let blob = Arc::new(FlakyBlobStore::default());
        let cache = Arc::new(VectorIndexCache::new(VectorRecordStore::new(blob.clone())));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    cache
                        .upsert(record(&format!("r{i}"), &format!("s{i}"), vec![i as f32, 1.0]))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(cache.load().await.unwrap().len(), 32);
        let reloaded = VectorIndexCache::new(VectorRecordStore::new(blob));
        assert_eq!(reloaded.load().await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn test_remove_variants() {
        let (_blob, cache) = memory_cache();
        cache
            .replace_all(vec![
                record("a", "1", vec![1.0]),
                record("b", "2", vec![1.0]),
                record("c", "3", vec![1.0]),
            ])
            .await
            .unwrap();

        assert!(cache.remove("a").await.unwrap());
        assert!(!cache.remove("a").await.unwrap());
        assert!(
            cache
                .remove_source(SourceType::KnowledgeNode, "3")
                .await
                .unwrap()
        );

        let ids: Vec<String> = cache.load().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn test_search_identical_and_orthogonal() {
        let (_blob, cache) = memory_cache();
        cache
            .replace_all(vec![
                record("x", "1", vec![1.0, 0.0, 0.0]),
                record("y", "2", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = cache.search(&[1.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].record.id, "x");
        assert!((hits[0].score - 1.0).abs() < 1e-6);

        let hits = cache.search(&[0.0, 0.0, 1.0], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|hit| hit.score.abs() < 1e-6));
    }

    #[tokio::test]
    async fn test_search_edge_cases() {
        let (_blob, cache) = memory_cache();

        // Empty index: no error, no hits.
        assert!(cache.search(&[1.0, 0.0], 5).await.unwrap().is_empty());

        cache
            .replace_all(vec![
                record("zero", "0", vec![0.0, 0.0]),
                record("a", "1", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert!(cache.search(&[1.0, 0.0], 0).await.unwrap().is_empty());

        let hits = cache.search(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.id, "a");

        for bad in [vec![], vec![1.0], vec![0.0, 0.0], vec![f32::NAN, 1.0]] {
            let err = cache.search(&bad, 5).await.unwrap_err();
            assert!(matches!(err, IndexError::Validation(_)), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_search_with_tiny_query_vector() {
        let (_blob, cache) = memory_cache();
        cache
            .replace_all(vec![
                record("a", "1", vec![1.0, 0.0]),
                record("b", "2", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = cache.search(&[1.0e-25, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.id, "a");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_search_ties_keep_cache_order() {
        let (_blob, cache) = memory_cache();
        cache
            .replace_all(vec![
                record("first", "1", vec![2.0, 0.0]),
                record("second", "2", vec![1.0, 0.0]),
                record("third", "3", vec![3.0, 0.0]),
            ])
            .await
            .unwrap();

        let ids: Vec<String> = cache
            .search(&[1.0, 0.0], 3)
            .await
            .unwrap()
            .into_iter()
            .map(|hit| hit.record.id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }
}
