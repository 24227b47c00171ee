//! Prompt types for the tourism guide.
//!
//! This module defines the prompt definitions loaded from YAML and the
//! bounded prompt produced by the composer.

use serde::{Deserialize, Serialize};

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier (e.g. "guide.faq")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Behavioral settings
    #[serde(default)]
    pub behavior: PromptBehavior,

    /// Which conversation parts the composer injects
    #[serde(default)]
    pub context: PromptContextConfig,

    /// System instruction template (Handlebars)
    #[serde(default)]
    pub system: String,

    /// User message template (Handlebars)
    pub template: String,

    /// Output specification
    #[serde(default)]
    pub output: PromptOutputSpec,
}

/// Behavioral settings for prompt execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBehavior {
    /// Tone (e.g., "friendly", "neutral")
    pub tone: String,

    /// Style (e.g., "concise", "detailed")
    pub style: String,
}

impl Default for PromptBehavior {
    fn default() -> Self {
        Self {
            tone: "friendly".to_string(),
            style: "concise".to_string(),
        }
    }
}

/// Context injection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContextConfig {
    /// Render prior conversation turns into `{{history}}`
    #[serde(rename = "includeHistory", default = "default_true")]
    pub include_history: bool,

    /// Render retrieved passages into `{{context}}`
    #[serde(rename = "includeSources", default = "default_true")]
    pub include_sources: bool,
}

impl Default for PromptContextConfig {
    fn default() -> Self {
        Self {
            include_history: true,
            include_sources: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Output specification for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    /// Output format (e.g., "text", "markdown", "label")
    pub format: String,
}

impl Default for PromptOutputSpec {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

/// One prior conversation turn handed to the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

impl HistoryTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A retrieved passage, already ranked best-first.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextPassage {
    /// Where the passage came from (file name, page)
    pub source: String,
    pub text: String,
}

impl ContextPassage {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System instruction (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// History turns that survived the budget
    #[serde(rename = "historyTurnsUsed")]
    pub history_turns_used: usize,

    /// Retrieved passages that survived the budget
    #[serde(rename = "passagesUsed")]
    pub passages_used: usize,

    /// Whether the user text was hard-truncated
    pub truncated: bool,
}

impl BuiltPrompt {
    /// Total characters sent to the model.
    pub fn char_len(&self) -> usize {
        self.system.as_deref().map_or(0, |s| s.chars().count()) + self.user.chars().count()
    }
}
