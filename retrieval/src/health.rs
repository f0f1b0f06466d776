//! Health reporting for the semantic memory.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use recall_embeddings::TextEmbedder;
use recall_index::VectorIndexCache;

use crate::engine::SemanticMemory;

/// Text embedded when probing the provider.
const PROBE_TEXT: &str = "health check";

/// Status of one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ComponentStatus {
    /// The component answered as expected.
    Ok,
    /// The component was not exercised.
    Skipped,
    /// The component failed.
    Failed(String),
}

impl ComponentStatus {
    fn is_failed(&self) -> bool {
        matches!(self, ComponentStatus::Failed(_))
    }
}

/// Result of a health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Whether every exercised component is healthy.
    pub healthy: bool,

    /// Index load status.
    pub index: ComponentStatus,

    /// Provider probe status.
    pub provider: ComponentStatus,

    /// Model the embedder requests.
    pub model: String,

    /// Records in the index, when it loaded.
    pub records: Option<usize>,

    /// Index dimension, when known.
    pub dimension: Option<usize>,
}

/// Checks that the index loads and, optionally, that the provider answers
/// with vectors matching the index dimension.
pub struct HealthCheck {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<VectorIndexCache>,
}

impl HealthCheck {
    /// Create a health check over an embedder and an index.
    pub fn new(embedder: Arc<dyn TextEmbedder>, index: Arc<VectorIndexCache>) -> Self {
        Self { embedder, index }
    }

    /// Create a health check for a semantic memory.
    pub fn for_memory(memory: &SemanticMemory) -> Self {
        Self::new(Arc::clone(memory.embedder()), Arc::clone(memory.index()))
    }

    /// Run the check. The provider is only called when `probe_provider` is set.
    pub async fn run(&self, probe_provider: bool) -> HealthReport {
        let (index, records, dimension) = match self.index.stats().await {
            Ok(stats) => (ComponentStatus::Ok, Some(stats.records), stats.dimension),
            Err(e) => {
                warn!("Health check: index failed to load: {e}");
                (ComponentStatus::Failed(e.to_string()), None, None)
            }
        };

        let provider = if probe_provider {
            match self.embedder.embed_one(PROBE_TEXT).await {
                Ok(vector) => match dimension {
                    Some(expected) if expected != vector.len() => ComponentStatus::Failed(format!(
                        "provider returned {} dimensions, index holds {expected}",
                        vector.len()
                    )),
                    _ => ComponentStatus::Ok,
                },
                Err(e) => {
                    warn!("Health check: provider probe failed: {e}");
                    ComponentStatus::Failed(e.to_string())
                }
            }
        } else {
            ComponentStatus::Skipped
        };

        let healthy = !index.is_failed() && !provider.is_failed();
        info!("Health check finished: healthy={healthy}");

        HealthReport {
            healthy,
            index,
            provider,
            model: self.embedder.model().to_string(),
            records,
            dimension,
        }
    }
}
