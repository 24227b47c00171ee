//! Prompt system for the tourism guide.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions (built-in, overridable from a directory)
//! - Handlebars template rendering
//! - Bounded composition of history, retrieved passages and structured context

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{compose, ComposeInput};
pub use loader::{load_prompt_file, PromptLibrary};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, ContextPassage, HistoryTurn, PromptBehavior,
    PromptContextConfig, PromptDefinition, PromptOutputSpec,
};
