//! In-memory knowledge store loaded from a JSONL index file.
//!
//! The file holds one `KnowledgeChunk` JSON object per line. It is read once
//! at startup and never written while serving.

use crate::types::{KnowledgeChunk, ScoredChunk};
use crate::vector_index::VectorIndex;
use guide_core::{AppError, AppResult};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Brute-force cosine index over immutable chunks.
#[derive(Debug, Clone, Default)]
pub struct JsonlIndex {
    chunks: Vec<KnowledgeChunk>,
    dimensions: Option<usize>,
}

impl JsonlIndex {
    /// Load every chunk from `path`.
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::Knowledge(format!("Failed to open index {:?}: {}", path, e))
        })?;

        let reader = BufReader::new(file);
        let mut chunks = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                AppError::Knowledge(format!("Failed to read line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let chunk: KnowledgeChunk = serde_json::from_str(&line).map_err(|e| {
                AppError::Knowledge(format!(
                    "Failed to parse line {} in {:?}: {}",
                    line_num + 1,
                    path,
                    e
                ))
            })?;

            chunks.push(chunk);
        }

        let index = Self::from_chunks(chunks)?;
        tracing::info!("Loaded {} chunks from {:?}", index.chunks.len(), path);
        Ok(index)
    }

    /// Build an index from chunks already in memory.
    ///
    /// Fails when chunks disagree on embedding width or carry no embedding.
    pub fn from_chunks(chunks: Vec<KnowledgeChunk>) -> AppResult<Self> {
        let mut dimensions = None;

        for chunk in &chunks {
            let len = chunk.embedding.len();
            if len == 0 {
                return Err(AppError::Knowledge(format!(
                    "Chunk {} has no embedding",
                    chunk.id
                )));
            }
            match dimensions {
                None => dimensions = Some(len),
                Some(d) if d != len => {
                    return Err(AppError::Knowledge(format!(
                        "Chunk {} has {} dimensions, expected {}",
                        chunk.id, len, d
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(Self { chunks, dimensions })
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }
}

impl VectorIndex for JsonlIndex {
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        if let Some(d) = self.dimensions {
            if query_embedding.len() != d {
                return Err(AppError::Knowledge(format!(
                    "Query embedding has {} dimensions, index has {}",
                    query_embedding.len(),
                    d
                )));
            }
        }

        let mut results: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .map(|chunk| ScoredChunk {
                score: cosine_similarity(query_embedding, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        results.sort_by(compare_scored);
        results.truncate(top_k);

        Ok(results)
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

/// Score descending, then position, then id.
fn compare_scored(a: &ScoredChunk, b: &ScoredChunk) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.chunk.position.cmp(&b.chunk.position))
        .then_with(|| a.chunk.id.cmp(&b.chunk.id))
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn chunk(id: &str, position: u32, embedding: Vec<f32>) -> KnowledgeChunk {
        KnowledgeChunk {
            id: id.to_string(),
            source_id: "guide.pdf".to_string(),
            position,
            text: format!("text {}", id),
            embedding,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_score() {
        let index = JsonlIndex::from_chunks(vec![
            chunk("low", 0, vec![0.0, 1.0]),
            chunk("high", 1, vec![1.0, 0.0]),
            chunk("mid", 2, vec![0.7, 0.7]),
        ])
        .unwrap();

        let results = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "high");
        assert_eq!(results[1].chunk.id, "mid");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_ties_broken_by_position_then_id() {
        let index = JsonlIndex::from_chunks(vec![
            chunk("b", 3, vec![1.0, 0.0]),
            chunk("z", 1, vec![1.0, 0.0]),
            chunk("a", 3, vec![1.0, 0.0]),
        ])
        .unwrap();

        let ids: Vec<_> = index
            .search(&[1.0, 0.0], 3)
            .unwrap()
            .into_iter()
            .map(|s| s.chunk.id)
            .collect();
        assert_eq!(ids, vec!["z", "a", "b"]);
    }

    #[test]
    fn test_mismatched_dimensions_rejected() {
        let result = JsonlIndex::from_chunks(vec![
            chunk("a", 0, vec![1.0, 0.0]),
            chunk("b", 1, vec![1.0, 0.0, 0.0]),
        ]);
        assert!(result.is_err());

        let index = JsonlIndex::from_chunks(vec![chunk("a", 0, vec![1.0, 0.0])]).unwrap();
        assert!(index.search(&[1.0, 0.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_load_jsonl() {
        let mut file = NamedTempFile::new().unwrap();
        for c in [chunk("a", 0, vec![1.0, 0.0]), chunk("b", 1, vec![0.0, 1.0])] {
            writeln!(file, "{}", serde_json::to_string(&c).unwrap()).unwrap();
        }
        writeln!(file).unwrap();

        let index = JsonlIndex::load(file.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimensions(), Some(2));
    }

    #[test]
    fn test_load_reports_bad_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{not json").unwrap();

        let err = JsonlIndex::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
