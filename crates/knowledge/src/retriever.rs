//! Top-K retrieval over the knowledge store.

use crate::embeddings::EmbeddingProvider;
use crate::types::RetrievalResult;
use crate::vector_index::VectorIndex;
use guide_core::{AppError, AppResult};
use std::sync::Arc;

/// Embeds a query and returns the best chunks above a score threshold.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    min_score: f32,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("chunks", &self.index.len())
            .field("embedder", &self.embedder.provider_name())
            .field("top_k", &self.top_k)
            .field("min_score", &self.min_score)
            .finish()
    }
}

impl Retriever {
    /// Pair an index with the provider that embedded it.
    ///
    /// Fails with a configuration error when their widths differ.
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
        min_score: f32,
    ) -> AppResult<Self> {
        if let Some(d) = index.dimensions() {
            if d != embedder.dimensions() {
                return Err(AppError::Config(format!(
                    "Index has {}-dimensional embeddings but provider '{}' produces {}",
                    d,
                    embedder.provider_name(),
                    embedder.dimensions()
                )));
            }
        }

        Ok(Self {
            index,
            embedder,
            top_k,
            min_score,
        })
    }

    /// Number of chunks available for retrieval.
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    /// Retrieve up to `top_k` chunks scoring at least `min_score`.
    ///
    /// An empty result means nothing relevant was found. Any failure of the
    /// embedding provider or the index is `AppError::RetrievalUnavailable`.
    pub async fn retrieve(&self, query: &str) -> AppResult<RetrievalResult> {
        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            AppError::RetrievalUnavailable(format!("query embedding failed: {}", e))
        })?;

        let results = self
            .index
            .search(&query_embedding, self.top_k)
            .map_err(|e| AppError::RetrievalUnavailable(format!("search failed: {}", e)))?;

        if !results.is_empty() {
            let all_scores: Vec<f32> = results.iter().map(|s| s.score).collect();
            tracing::debug!(
                "Retrieved {} chunks before filtering - scores: {:?}",
                results.len(),
                all_scores
            );
        }

        let chunks: Vec<_> = results
            .into_iter()
            .filter(|s| s.score >= self.min_score)
            .collect();

        if chunks.is_empty() {
            tracing::info!(
                "No relevant chunks found (all scores below {:.2} threshold)",
                self.min_score
            );
        } else {
            tracing::info!(
                "Retrieved {} relevant chunks (top score: {:.3}, lowest: {:.3})",
                chunks.len(),
                chunks.first().map_or(0.0, |c| c.score),
                chunks.last().map_or(0.0, |c| c.score)
            );
        }

        Ok(RetrievalResult::new(chunks))
    }
}
