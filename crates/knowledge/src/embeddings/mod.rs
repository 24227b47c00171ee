//! Query embedding providers.
//!
//! The serving path only embeds queries; chunk embeddings come pre-computed
//! in the index file and must use the same provider and dimensions.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
