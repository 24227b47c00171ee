//! Knowledge store and retrieval for the tourism guide.
//!
//! Chunks are pre-indexed offline into a JSONL file with embeddings. At
//! startup the file is loaded into memory; each query is embedded with the
//! same provider and matched by cosine similarity.

pub mod embeddings;
pub mod rag;
pub mod retriever;
pub mod store;
pub mod types;
pub mod vector_index;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use rag::{source_refs, SourceRef};
pub use retriever::Retriever;
pub use store::JsonlIndex;
pub use types::{KnowledgeChunk, RetrievalResult, ScoredChunk};
pub use vector_index::VectorIndex;

