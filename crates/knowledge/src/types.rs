//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// A pre-indexed text chunk with its embedding.
///
/// Chunks are produced offline and are immutable at serving time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Source document ID
    pub source_id: String,

    /// Position within source
    #[serde(default)]
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector (normalized)
    pub embedding: Vec<f32>,

    /// Metadata (e.g., source_path, page)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl KnowledgeChunk {
    /// Metadata string field, if present.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// A chunk paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: KnowledgeChunk,
    pub score: f32,
}

/// Retrieved chunks, highest score first.
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub chunks: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn new(chunks: Vec<ScoredChunk>) -> Self {
        Self { chunks }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Best score, or 0.0 when nothing was retrieved.
    pub fn max_score(&self) -> f32 {
        self.chunks.first().map_or(0.0, |c| c.score)
    }
}
