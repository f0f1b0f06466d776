//! # Retrieval
//!
//! This crate ties the embeddings and vector index crates into a single
//! semantic memory:
//!
//! - **Remember**: embed text units and upsert them as records
//! - **Recall**: embed a query and rank stored records by cosine similarity
//! - **Health**: verify that the index loads and the provider answers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Semantic Memory                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  TextItem ──► TextEmbedder ──► EmbeddingRecord ──► VectorIndex  │
//! │                                                        │        │
//! │  query ───► TextEmbedder ──► vector ──► search ◄───────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recall_retrieval::{RecallConfig, SemanticMemory, TextItem};
//! use recall_index::SourceType;
//!
//! let memory = SemanticMemory::from_config(&RecallConfig::load("recall.toml")?).await?;
//! memory
//!     .remember(TextItem::new(SourceType::KnowledgeNode, "node-1", "alpha system"))
//!     .await?;
//! let hits = memory.recall("alpha", Some(5)).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod health;

pub use config::{
    EmbeddingConfig, EmbeddingProviderType, RecallConfig, SearchConfig, StorageBackend,
    StorageConfig,
};
pub use engine::{SemanticMemory, TextItem, build_embedder};
pub use error::{Result, RetrievalError};
pub use health::{ComponentStatus, HealthCheck, HealthReport};

// Re-export from dependencies for convenience
pub use recall_embeddings::{EmbeddingProvider, TextEmbedder};
pub use recall_index::{EmbeddingRecord, SearchHit, SourceType, VectorIndexCache};
