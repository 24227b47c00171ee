//! Vector index abstraction for knowledge chunks.
//!
//! Defines a trait for provider-agnostic, read-only similarity search.

use crate::types::ScoredChunk;
use guide_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must return at most `top_k` results ordered by
/// non-increasing score, with a deterministic order among equal scores.
pub trait VectorIndex: Send + Sync {
    /// Search for the top-k most similar chunks to the query embedding.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>>;

    /// Number of chunks held by the index.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding width shared by every chunk, if known.
    fn dimensions(&self) -> Option<usize>;
}
