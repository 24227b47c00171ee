//! Mapping retrieved chunks to user-facing source references.

use crate::rag::types::{SourceRef, MAX_SNIPPET_LENGTH};
use crate::types::{KnowledgeChunk, RetrievalResult};
use std::collections::HashSet;

/// One reference per distinct (source, location), in retrieval order.
pub fn source_refs(result: &RetrievalResult) -> Vec<SourceRef> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for scored in &result.chunks {
        let source = source_name(&scored.chunk);
        let location = location(&scored.chunk);

        if seen.insert((source.clone(), location.clone())) {
            sources.push(SourceRef {
                source,
                location,
                snippet: truncate_snippet(&scored.chunk.text, MAX_SNIPPET_LENGTH),
                score: (scored.score * 1000.0).round() / 1000.0,
            });
        }
    }

    sources
}

/// Human-readable source name: `source_path` file name, else `source_id`.
pub fn source_name(chunk: &KnowledgeChunk) -> String {
    let raw = chunk.meta_str("source_path").unwrap_or(&chunk.source_id);
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).to_string()
}

/// Page when known, else the chunk position.
fn location(chunk: &KnowledgeChunk) -> String {
    match chunk.metadata.get("page") {
        Some(page) if page.is_u64() || page.is_string() => {
            let page = page
                .as_u64()
                .map(|p| p.to_string())
                .or_else(|| page.as_str().map(str::to_string))
                .unwrap_or_default();
            format!("page {}", page)
        }
        _ => format!("section {}", chunk.position + 1),
    }
}

/// Truncate at a word boundary, counting characters.
pub fn truncate_snippet(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_len).collect();
    match truncated.rfind(char::is_whitespace) {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScoredChunk;

    fn scored(id: &str, source: &str, metadata: serde_json::Value, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: KnowledgeChunk {
                id: id.to_string(),
                source_id: source.to_string(),
                position: 3,
                text: "Betla National Park lies in the Palamu district.".to_string(),
                embedding: vec![1.0],
                metadata,
            },
            score,
        }
    }

    #[test]
    fn test_source_name_prefers_path_file_name() {
        let chunk = scored(
            "c1",
            "src-1",
            serde_json::json!({"source_path": "data/docs/betla.pdf"}),
            0.5,
        )
        .chunk;
        assert_eq!(source_name(&chunk), "betla.pdf");

        let chunk = scored("c1", "wildlife.pdf", serde_json::Value::Null, 0.5).chunk;
        assert_eq!(source_name(&chunk), "wildlife.pdf");
    }

    #[test]
    fn test_refs_deduplicated_in_order() {
        let result = RetrievalResult::new(vec![
            scored("c1", "a.pdf", serde_json::json!({"page": 2}), 0.9),
            scored("c2", "a.pdf", serde_json::json!({"page": 2}), 0.8),
            scored("c3", "b.pdf", serde_json::Value::Null, 0.7),
        ]);

        let refs = source_refs(&result);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].source, "a.pdf");
        assert_eq!(refs[0].location, "page 2");
        assert_eq!(refs[1].location, "section 4");
    }

    #[test]
    fn test_truncate_snippet() {
        assert_eq!(truncate_snippet("short", 10), "short");
        assert_eq!(truncate_snippet("hello wonderful world", 12), "hello...");
        assert_eq!(truncate_snippet("abcdefghijkl", 5), "abcde...");
    }
}
