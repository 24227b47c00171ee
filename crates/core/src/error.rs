//! Error types for the tourism guide service.
//!
//! A single error enum covers configuration, I/O, model, retrieval, prompt
//! and serialization failures. Domain rejection is not an error: it is an
//! ordinary chat response.

use thiserror::Error;

/// Unified error type for the tourism guide service.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic on the request path; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors (transport, status, payload)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Hosted generation failed, timed out, or returned nothing
    #[error("Generation error: {0}")]
    Generation(String),

    /// Knowledge store or query embedding could not be reached
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Knowledge base errors (index contents, embeddings)
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Short machine-readable kind, used in chat response payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "configuration",
            AppError::Io(_) => "io",
            AppError::Llm(_) | AppError::Generation(_) => "generation",
            AppError::RetrievalUnavailable(_) | AppError::Knowledge(_) => "retrieval_unavailable",
            AppError::Prompt(_) => "prompt",
            AppError::Serialization(_) => "serialization",
            AppError::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
