//! # Embeddings
//!
//! This crate turns text into dense vectors and compares them.
//!
//! ## Features
//!
//! - **Providers**: one external call per batch (OpenAI-compatible HTTP, or an
//!   offline feature-hashing provider)
//! - **Batching**: arbitrary input lists are split into bounded batches,
//!   dispatched sequentially, and reassembled in order
//! - **Retries**: transient failures (429, 5xx, connect/timeout) are retried
//!   with exponential backoff
//! - **Similarity**: cosine similarity and exact top-k ranking
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  texts ──► RetryingBatchEmbedder ──► RetryPolicy ──► Provider   │
//! │                    │                                            │
//! │                    ▼                                            │
//! │               Vec<Embedding> ──► similarity::rank_top_k         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod embedder;
pub mod error;
pub mod provider;
pub mod retry;
pub mod similarity;

pub use embedder::{DEFAULT_MAX_BATCH_SIZE, RetryingBatchEmbedder, TextEmbedder};
pub use error::{EmbeddingError, ProviderCallError, Result};
pub use provider::{EmbeddingProvider, HashingProvider, OpenAIProvider};
pub use retry::RetryPolicy;
pub use similarity::{RankedCandidate, cosine_similarity, l2_norm, rank_top_k};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
