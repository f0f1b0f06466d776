//! Persisted data model: embedding records and the index document.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recall_embeddings::Embedding;

/// Current schema version for records and index documents.
pub const SCHEMA_VERSION: u32 = 1;

/// What produced the embedded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// A node of the knowledge tree.
    KnowledgeNode,
    /// A logged conversation turn.
    ConversationLog,
    /// A chunk of an ingested document.
    DocumentChunk,
    /// A context file summary.
    ContextFile,
}

impl SourceType {
    /// All known source types.
    pub const ALL: [SourceType; 4] = [
        SourceType::KnowledgeNode,
        SourceType::ConversationLog,
        SourceType::DocumentChunk,
        SourceType::ContextFile,
    ];

    /// Wire name of this source type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::KnowledgeNode => "knowledge-node",
            SourceType::ConversationLog => "conversation-log",
            SourceType::DocumentChunk => "document-chunk",
            SourceType::ContextFile => "context-file",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceType::ALL
            .into_iter()
            .find(|source_type| source_type.as_str() == s)
            .ok_or_else(|| format!("unknown source type: {s}"))
    }
}

/// Auxiliary metadata carried with a record. Opaque to the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    /// Model that produced the vector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Node type hint for knowledge-node sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    /// Reference to the file backing the source text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,

    /// Any other keys, preserved as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RecordMeta {
    /// Metadata naming only the model.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Set the node type hint.
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Set the source file reference.
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }
}

/// One source unit mapped to one vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRecord {
    /// Unique identifier, immutable once assigned.
    pub id: String,

    /// Record format version.
    pub schema_version: u32,

    /// What produced the text.
    pub source_type: SourceType,

    /// Identifier of the originating entity.
    pub source_id: String,

    /// The embedding vector.
    pub vector: Embedding,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// Optional auxiliary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<RecordMeta>,
}

impl EmbeddingRecord {
    /// Create a record with a fresh id.
    pub fn new(source_type: SourceType, source_id: impl Into<String>, vector: Embedding) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            schema_version: SCHEMA_VERSION,
            source_type,
            source_id: source_id.into(),
            vector,
            created_at: Utc::now(),
            meta: None,
        }
    }

    /// Use an explicit id instead of a generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attach metadata.
    pub fn with_meta(mut self, meta: RecordMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Vector length.
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// The alternate identity key.
    pub fn source_key(&self) -> (SourceType, &str) {
        (self.source_type, self.source_id.as_str())
    }

    /// Whether `other` has the same `id` or the same `(sourceType, sourceId)`.
    pub fn same_identity(&self, other: &EmbeddingRecord) -> bool {
        self.id == other.id || self.source_key() == other.source_key()
    }

    /// Check the record contract in isolation.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("record id must not be empty".to_string());
        }
        if self.schema_version == 0 {
            return Err(format!("record {} has schema version 0", self.id));
        }
        if self.source_id.trim().is_empty() {
            return Err(format!("record {} has an empty sourceId", self.id));
        }
        if self.vector.is_empty() {
            return Err(format!("record {} has an empty vector", self.id));
        }
        if let Some(position) = self.vector.iter().position(|v| !v.is_finite()) {
            return Err(format!(
                "record {} has a non-finite value at vector position {position}",
                self.id
            ));
        }
        Ok(())
    }
}

/// Validate a full record list: each record, plus identity uniqueness and a
/// single shared dimension. Returns the first violation found.
pub fn validate_record_set(records: &[EmbeddingRecord]) -> Result<(), String> {
    let mut ids = HashSet::new();
    let mut source_keys = HashSet::new();
    let mut dimension = None;

    for (position, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|e| format!("record at position {position}: {e}"))?;

        let expected = *dimension.get_or_insert(record.dimension());
        if record.dimension() != expected {
            return Err(format!(
                "record at position {position} ({}) has dimension {}, expected {expected}",
                record.id,
                record.dimension()
            ));
        }

        if !ids.insert(record.id.as_str()) {
            return Err(format!(
                "record at position {position} duplicates id {}",
                record.id
            ));
        }

        if !source_keys.insert(record.source_key()) {
            return Err(format!(
                "record at position {position} duplicates source {}:{}",
                record.source_type, record.source_id
            ));
        }
    }

    Ok(())
}

/// The whole index as stored under one blob key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorIndexFile {
    /// Document format version.
    pub schema_version: u32,

    /// When the index was first initialized.
    pub created_at: DateTime<Utc>,

    /// When the document was last written.
    pub updated_at: DateTime<Utc>,

    /// Records in insertion order.
    pub records: Vec<EmbeddingRecord>,
}

impl VectorIndexFile {
    /// A fresh, empty index document.
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
            records: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: &str, source_id: &str, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord::new(SourceType::KnowledgeNode, source_id, vector).with_id(id)
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let rec = record("r1", "node-1", vec![1.0, 0.5]).with_meta(
            RecordMeta::for_model("m")
                .with_node_type("Project")
                .with_source_ref("notes/a.md"),
        );

        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["sourceType"], "knowledge-node");
        assert_eq!(value["sourceId"], "node-1");
        assert_eq!(value["schemaVersion"], 1);
        assert_eq!(value["meta"]["nodeType"], "Project");
        assert_eq!(value["meta"]["sourceRef"], "notes/a.md");
        assert!(value.get("createdAt").is_some());

        let back: EmbeddingRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_meta_keeps_unknown_keys() {
        let meta: RecordMeta = serde_json::from_value(serde_json::json!({
            "model": "m",
            "chunkIndex": 3
        }))
        .unwrap();

        assert_eq!(meta.model.as_deref(), Some("m"));
        assert_eq!(meta.extra["chunkIndex"], 3);

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["chunkIndex"], 3);
    }

    #[test]
    fn test_source_type_parse() {
        assert_eq!(
            "document-chunk".parse::<SourceType>().unwrap(),
            SourceType::DocumentChunk
        );
        assert!("mystery".parse::<SourceType>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        assert!(record("", "s", vec![1.0]).validate().is_err());
        assert!(record("r", " ", vec![1.0]).validate().is_err());
        assert!(record("r", "s", vec![]).validate().is_err());
        assert!(record("r", "s", vec![f32::INFINITY]).validate().is_err());
        assert!(record("r", "s", vec![0.0, 0.0]).validate().is_ok());
    }

    #[test]
    fn test_record_set_checks_identity_and_dimension() {
        let ok = vec![record("a", "1", vec![1.0, 0.0]), record("b", "2", vec![0.0, 1.0])];
        assert!(validate_record_set(&ok).is_ok());

        let dup_id = vec![record("a", "1", vec![1.0]), record("a", "2", vec![1.0])];
        assert!(validate_record_set(&dup_id).unwrap_err().contains("duplicates id"));

        let dup_source = vec![record("a", "1", vec![1.0]), record("b", "1", vec![1.0])];
        assert!(
            validate_record_set(&dup_source)
                .unwrap_err()
                .contains("duplicates source")
        );

        let mixed = vec![record("a", "1", vec![1.0]), record("b", "2", vec![1.0, 2.0])];
        assert!(validate_record_set(&mixed).unwrap_err().contains("dimension"));
    }
}
