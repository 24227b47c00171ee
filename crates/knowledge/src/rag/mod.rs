//! Source references for retrieval-augmented answers.

pub mod sources;
pub mod types;

pub use sources::{source_name, source_refs, truncate_snippet};
pub use types::SourceRef;
