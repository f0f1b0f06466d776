//! Batched, retrying embedding generation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{EmbeddingError, Result};
use crate::provider::EmbeddingProvider;
use crate::retry::RetryPolicy;
use crate::Embedding;

/// Default maximum number of texts sent in one provider call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 128;

/// Anything that can turn texts into vectors.
///
/// Higher layers (the retrieval facade, health checks) depend on this trait
/// rather than on a concrete embedder.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Model identifier recorded alongside generated vectors.
    fn model(&self) -> &str;

    /// Embed every text, preserving order.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Embedding> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EmbeddingError::Validation(
                "text must not be empty".to_string(),
            ));
        }

        self.embed_many(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Provider {
                attempts: 1,
                retryable: false,
                message: "provider returned no vector for a single input".to_string(),
            })
    }
}

/// Splits texts into bounded batches and embeds each batch under a retry policy.
///
/// Batches are dispatched sequentially, so total latency is the sum of the
/// per-batch calls.
pub struct RetryingBatchEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    max_batch_size: usize,
    retry: RetryPolicy,
}

impl RetryingBatchEmbedder {
    /// Create an embedder using the provider's default model.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let model = provider.default_model().to_string();
        Self {
            provider,
            model,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }

    /// Set the model to request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the maximum batch size (clamped to at least 1).
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Embedding>> {
        let mut attempts = 0;
        let vectors = self
            .retry
            .run(|attempt| {
                attempts = attempt;
                self.provider.embed(&self.model, batch)
            })
            .await?;

        validate_response(batch.len(), &vectors).map_err(|message| EmbeddingError::Provider {
            attempts,
            retryable: false,
            message,
        })?;

        Ok(vectors)
    }
}

#[async_trait]
impl TextEmbedder for RetryingBatchEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        validate_texts(texts)?;

        if texts.len() <= self.max_batch_size {
            debug!("Embedding {} texts in a single batch", texts.len());
            return self.embed_batch(texts).await;
        }

        let batches = texts.len().div_ceil(self.max_batch_size);
        debug!(
            "Embedding {} texts in {batches} batches of at most {}",
            texts.len(),
            self.max_batch_size
        );

        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.max_batch_size) {
            results.extend(self.embed_batch(batch).await?);
        }

        info!("Generated {} embeddings", results.len());
        Ok(results)
    }
}

fn validate_texts(texts: &[String]) -> Result<()> {
    if texts.is_empty() {
        return Err(EmbeddingError::Validation(
            "at least one text is required".to_string(),
        ));
    }

    if let Some(index) = texts.iter().position(|text| text.trim().is_empty()) {
        return Err(EmbeddingError::Validation(format!(
            "text at index {index} is empty"
        )));
    }

    Ok(())
}

fn validate_response(expected: usize, vectors: &[Embedding]) -> std::result::Result<(), String> {
    if vectors.len() != expected {
        return Err(format!(
            "provider returned {} vectors for {expected} inputs",
            vectors.len()
        ));
    }

    for (index, vector) in vectors.iter().enumerate() {
        if vector.is_empty() {
            return Err(format!("provider returned an empty vector at index {index}"));
        }
        if vector.iter().any(|value| !value.is_finite()) {
            return Err(format!(
                "provider returned a non-finite value in the vector at index {index}"
            ));
        }
    }

    Ok(())
}
