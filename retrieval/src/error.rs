//! Error types for the semantic memory facade.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval layer.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] recall_embeddings::EmbeddingError),

    /// Vector index error.
    #[error("index error: {0}")]
    Index(#[from] recall_index::IndexError),

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] recall_index::StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
