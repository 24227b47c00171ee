//! Embedding provider implementations.

pub mod gemini;
pub mod trigram;

pub use gemini::GeminiEmbeddingProvider;
pub use trigram::TrigramProvider;
