//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors surfaced to callers of the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Caller input failed validation (empty batch, blank text, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The provider call failed after retries, or returned an unusable response.
    #[error(
        "embedding provider failed after {attempts} attempt(s) (attempt = {attempts}, retryable: {retryable}): {message}"
    )]
    Provider {
        attempts: u32,
        retryable: bool,
        message: String,
    },

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// Whether this error came from the provider side rather than from input validation.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, EmbeddingError::Provider { .. })
    }
}

/// Failure of a single provider call, before any retry decision is made.
#[derive(Error, Debug)]
pub enum ProviderCallError {
    /// Provider not configured (missing API key, bad base URL, ...).
    #[error("embedding provider not configured: {0}")]
    NotConfigured(String),

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection could not be established or the request timed out.
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderCallError {
    /// Rate limiting, server errors and connect/timeout failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderCallError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderCallError::Transport(_) => true,
            ProviderCallError::NotConfigured(_)
            | ProviderCallError::Request(_)
            | ProviderCallError::MalformedResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderCallError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ProviderCallError::Transport(err.to_string())
        } else if err.is_decode() {
            ProviderCallError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderCallError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ProviderCallError::Request(err.to_string())
        }
    }
}
