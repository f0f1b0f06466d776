//! # Vector Index
//!
//! A persisted collection of embedding records with exact cosine search.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Vector Index                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  caller ──► VectorIndexCache ──► VectorRecordStore ──► BlobStore │
//! │                   │                                             │
//! │                   ▼                                             │
//! │             IndexSnapshot (records + norms) ──► search          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole index lives in one JSON document under one key. Callers never
//! talk to the store directly; the cache owns loading, validation and the
//! persist-then-swap update order.

pub mod blob;
pub mod cache;
pub mod error;
pub mod record;
pub mod store;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use cache::{CachedEmbedding, IndexSnapshot, IndexStats, SearchHit, UpsertOutcome, VectorIndexCache};
pub use error::{IndexError, Result, StorageError};
pub use record::{EmbeddingRecord, RecordMeta, SCHEMA_VERSION, SourceType, VectorIndexFile};
pub use store::{DEFAULT_INDEX_KEY, VectorRecordStore};
