//! RAG response types.

use serde::{Deserialize, Serialize};

/// A single source reference used to answer a query.
///
/// This is the user-facing representation of where information came from.
/// Internal details like chunk IDs and embeddings are hidden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// Source file or document name (e.g., "jharkhand_tourism.pdf")
    pub source: String,

    /// Human-readable location within the source ("page 4", "section 2")
    pub location: String,

    /// Short snippet showing the relevant evidence (truncated if needed)
    pub snippet: String,

    /// Similarity score, rounded for display
    pub score: f32,
}

/// Maximum snippet length shown to users, in characters.
pub const MAX_SNIPPET_LENGTH: usize = 160;
