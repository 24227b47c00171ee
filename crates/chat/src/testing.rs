//! In-memory fixtures for handler and router tests.

use crate::context::GuideContext;
use crate::records::Records;
use guide_core::{AppConfig, AppError, AppResult};
use guide_knowledge::embeddings::providers::TrigramProvider;
use guide_knowledge::{
    EmbeddingProvider, JsonlIndex, KnowledgeChunk, Retriever, ScoredChunk, VectorIndex,
};
use guide_llm::MockClient;
use std::sync::Arc;

pub(crate) const GUIDE_TEXTS: &[&str] = &[
    "Hundru Falls is a 98 metre waterfall on the Subarnarekha river, about 45 km from Ranchi.",
    "Betla National Park in Latehar is home to elephants, bison and the ruins of Palamu Fort.",
    "Baidyanath Dham in Deoghar is one of the twelve Jyotirlingas and draws pilgrims during Shravani Mela.",
    "Netarhat, the Queen of Chotanagpur, is known for sunrise and sunset views from Magnolia Point.",
];

const DIMENSIONS: usize = 64;

pub(crate) async fn context(client: Arc<MockClient>) -> GuideContext {
    context_with(&AppConfig::default(), client, GUIDE_TEXTS).await
}

pub(crate) async fn context_with(
    config: &AppConfig,
    client: Arc<MockClient>,
    texts: &[&str],
) -> GuideContext {
    let embedder = Arc::new(TrigramProvider::new(DIMENSIONS));

    let mut chunks = Vec::new();
    for (i, text) in texts.iter().enumerate() {
        chunks.push(KnowledgeChunk {
            id: format!("guide-{}", i),
            source_id: "jharkhand-guide".to_string(),
            position: i as u32,
            text: text.to_string(),
            embedding: embedder.embed(text).await.unwrap(),
            metadata: serde_json::json!({ "source_path": "guides/jharkhand_tourism.pdf", "page": i + 1 }),
        });
    }

    let index = JsonlIndex::from_chunks(chunks).unwrap();
    let retriever =
        Retriever::new(Arc::new(index), embedder, config.knowledge.top_k, 0.1).unwrap();
    GuideContext::from_parts(config, retriever, client, Records::builtin().unwrap()).unwrap()
}

/// An index whose every search fails.
struct OfflineIndex;

impl VectorIndex for OfflineIndex {
    fn search(&self, _query_embedding: &[f32], _top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        Err(AppError::Knowledge("index offline".to_string()))
    }

    fn len(&self) -> usize {
        0
    }

    fn dimensions(&self) -> Option<usize> {
        None
    }
}

pub(crate) fn broken_retriever() -> Retriever {
    Retriever::new(
        Arc::new(OfflineIndex),
        Arc::new(TrigramProvider::new(DIMENSIONS)),
        4,
        0.1,
    )
    .unwrap()
}
