//! Embedding providers.
//!
//! A provider performs exactly one external call turning N texts into N
//! vectors. Retrying and batching live in [`crate::embedder`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ProviderCallError;
use crate::Embedding;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;

    /// Embed `inputs` with `model`, returning one vector per input in the same order.
    async fn embed(
        &self,
        model: &str,
        inputs: &[String],
    ) -> std::result::Result<Vec<Embedding>, ProviderCallError>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// OpenAI-compatible embedding provider (`POST {base_url}/embeddings`).
pub struct OpenAIProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Default model.
    default_model: String,

    /// Requested output dimensions, for models that support shortening.
    dimensions: Option<usize>,

    /// Per-request timeout.
    timeout: Option<Duration>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider, reading the key from `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self::from_env("OPENAI_API_KEY")
    }

    /// Create a provider reading its key from the named environment variable.
    pub fn from_env(var: &str) -> Self {
        Self {
            api_key: std::env::var(var).ok().filter(|key| !key.trim().is_empty()),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            default_model: "text-embedding-3-small".to_string(),
            dimensions: None,
            timeout: None,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Request shortened output vectors.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Bound every request by `timeout`; an elapsed timeout counts as transient.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn embed(
        &self,
        model: &str,
        inputs: &[String],
    ) -> std::result::Result<Vec<Embedding>, ProviderCallError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderCallError::NotConfigured("no API key set for the openai provider".to_string())
        })?;

        debug!(
            "Requesting {} embeddings from {} with model: {model}",
            inputs.len(),
            self.base_url
        );

        let mut body = serde_json::json!({
            "input": inputs,
            "model": model
        });

        if let Some(dims) = self.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderCallError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let result: OpenAIEmbeddingResponse = response.json().await?;

        let mut data = result.data;
        data.sort_by_key(|item| item.index);
        let embeddings: Vec<Embedding> = data.into_iter().map(|item| item.embedding).collect();

        info!(
            "Generated {} embeddings with model {}",
            embeddings.len(),
            result.model
        );

        Ok(embeddings)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Deterministic offline provider based on feature hashing.
///
/// Every lower-cased alphanumeric token is hashed into one of `dimension`
/// buckets with a hash-derived sign. Texts sharing words end up pointing in
/// similar directions, which is enough for local runs and demos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    /// Create a hashing provider producing vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Output dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let hash = fnv1a(token.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        vector
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    fn default_model(&self) -> &str {
        "feature-hashing"
    }

    async fn embed(
        &self,
        _model: &str,
        inputs: &[String],
    ) -> std::result::Result<Vec<Embedding>, ProviderCallError> {
        Ok(inputs.iter().map(|text| self.embed_text(text)).collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}
