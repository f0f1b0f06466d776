//! Error types for the vector index.

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur in the vector index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// A record or query failed validation. Nothing was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// The persisted document's outer shape is unusable.
    #[error("corrupt index document: {0}")]
    CorruptIndex(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Blob storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to read a stored document.
    #[error("failed to read file: {0}")]
    ReadFile(String),

    /// Failed to write a stored document.
    #[error("failed to write file: {0}")]
    WriteFile(String),

    /// A stored payload is not a JSON document.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The backend refused or could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
