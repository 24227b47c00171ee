//! Prompt composer: renders a definition into a model input that fits a
//! character budget.

use crate::loader::PromptLibrary;
use crate::types::{BuiltPrompt, BuiltPromptMetadata, ContextPassage, HistoryTurn};
use guide_core::AppResult;
use std::collections::HashMap;

/// Everything a prompt can draw on besides its template.
#[derive(Debug, Clone, Default)]
pub struct ComposeInput {
    /// Template variables (e.g. "query", "region", "attractions")
    pub variables: HashMap<String, String>,

    /// Retrieved passages, best first
    pub passages: Vec<ContextPassage>,

    /// Prior turns, oldest first
    pub history: Vec<HistoryTurn>,
}

impl ComposeInput {
    pub fn new(query: impl Into<String>) -> Self {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.into());
        Self {
            variables,
            passages: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn passages(mut self, passages: Vec<ContextPassage>) -> Self {
        self.passages = passages;
        self
    }

    pub fn history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }
}

/// Compose a prompt whose `system` + `user` length never exceeds `max_chars`.
///
/// Over budget, the composer drops the oldest history turns, then the
/// lowest-ranked passages, and finally truncates the rendered user text.
///
/// # Example
/// ```no_run
/// use guide_prompt::{compose, ComposeInput, PromptLibrary};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let library = PromptLibrary::builtin()?;
/// let input = ComposeInput::new("When does Sarhul happen?").var("region", "Jharkhand");
/// let built = compose(&library, "guide.faq", &input, 12_000)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn compose(
    library: &PromptLibrary,
    prompt_id: &str,
    input: &ComposeInput,
    max_chars: usize,
) -> AppResult<BuiltPrompt> {
    let definition = library.get(prompt_id)?;
    tracing::debug!("Composing prompt: {}", definition.id);

    let mut system = library.render_system(prompt_id, &input.variables)?;
    if system.chars().count() > max_chars {
        system = truncate_chars(&system, max_chars);
    }
    let system_len = system.chars().count();

    let mut turns: &[HistoryTurn] = if definition.context.include_history {
        &input.history
    } else {
        &[]
    };
    let mut passages: &[ContextPassage] = if definition.context.include_sources {
        &input.passages
    } else {
        &[]
    };

    let mut variables = input.variables.clone();
    let (user, truncated) = loop {
        variables.insert("history".to_string(), render_history(turns));
        variables.insert("context".to_string(), render_passages(passages));
        let user = library.render_template(prompt_id, &variables)?;

        if system_len + user.chars().count() <= max_chars {
            break (user, false);
        }
        if !turns.is_empty() {
            turns = &turns[1..];
        } else if !passages.is_empty() {
            passages = &passages[..passages.len() - 1];
        } else {
            tracing::warn!(
                "Prompt {} exceeds {} chars with no history or passages; truncating",
                prompt_id,
                max_chars
            );
            break (truncate_chars(&user, max_chars - system_len), true);
        }
    };

    if turns.len() < input.history.len() || passages.len() < input.passages.len() {
        tracing::debug!(
            "Prompt budget kept {}/{} turns and {}/{} passages",
            turns.len(),
            input.history.len(),
            passages.len(),
            input.passages.len()
        );
    }

    Ok(BuiltPrompt {
        system: if system.trim().is_empty() {
            None
        } else {
            Some(system)
        },
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            history_turns_used: turns.len(),
            passages_used: passages.len(),
            truncated,
        },
    })
}

fn render_history(turns: &[HistoryTurn]) -> String {
    turns
        .iter()
        .map(|turn| {
            let speaker = if turn.role.eq_ignore_ascii_case("assistant") {
                "Assistant"
            } else {
                "User"
            };
            format!("{}: {}", speaker, turn.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_passages(passages: &[ContextPassage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("[{}] ({}) {}", i + 1, p.source, p.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> PromptLibrary {
        PromptLibrary::builtin().unwrap()
    }

    fn history(n: usize) -> Vec<HistoryTurn> {
        (0..n)
            .map(|i| {
                let role = if i % 2 == 0 { "user" } else { "assistant" };
                HistoryTurn::new(role, format!("turn number {} {}", i, "x".repeat(80)))
            })
            .collect()
    }

    fn passages(n: usize) -> Vec<ContextPassage> {
        (0..n)
            .map(|i| ContextPassage::new(format!("doc{}.pdf", i), format!("passage {} {}", i, "y".repeat(200))))
            .collect()
    }

    #[test]
    fn test_compose_renders_query_and_context() {
        let input = ComposeInput::new("Where is Hundru Falls?")
            .var("region", "Jharkhand")
            .passages(vec![ContextPassage::new("falls.pdf", "Hundru Falls is 45 km from Ranchi.")]);

        let built = compose(&library(), "guide.faq", &input, 12_000).unwrap();
        assert!(built.user.contains("Where is Hundru Falls?"));
        assert!(built.user.contains("[1] (falls.pdf) Hundru Falls is 45 km from Ranchi."));
        assert!(built.system.as_deref().unwrap_or("").contains("Jharkhand"));
        assert_eq!(built.metadata.passages_used, 1);
        assert!(!built.metadata.truncated);
    }

    #[test]
    fn test_oldest_history_dropped_first() {
        let input = ComposeInput::new("And the best season?")
            .var("region", "Jharkhand")
            .history(history(40))
            .passages(passages(2));

        let unbounded = compose(&library(), "guide.faq", &input, 100_000).unwrap();
        let budget = unbounded.char_len() - 300;
        let built = compose(&library(), "guide.faq", &input, budget).unwrap();

        assert!(built.char_len() <= budget);
        assert!(built.metadata.history_turns_used < 40);
        assert_eq!(built.metadata.passages_used, 2);
        // Newest turn survives
        assert!(built.user.contains("turn number 39"));
        assert!(!built.user.contains("turn number 0 "));
    }

    #[test]
    fn test_passages_dropped_after_history() {
        let input = ComposeInput::new("Tell me about Betla")
            .var("region", "Jharkhand")
            .history(history(2))
            .passages(passages(4));

        let unbounded = compose(&library(), "guide.faq", &input, 100_000).unwrap();
        let budget = unbounded.char_len() - 450;
        let built = compose(&library(), "guide.faq", &input, budget).unwrap();

        assert!(built.char_len() <= budget);
        assert_eq!(built.metadata.history_turns_used, 0);
        assert!(built.metadata.passages_used < 4);
        // Best-ranked passage kept
        assert!(built.user.contains("passage 0"));
    }

    #[test]
    fn test_hard_truncation_respects_bound() {
        let long_query = "w".repeat(5_000);
        let input = ComposeInput::new(long_query).var("region", "Jharkhand");

        for budget in [600, 1_000, 3_000] {
            let built = compose(&library(), "guide.faq", &input, budget).unwrap();
            assert!(built.char_len() <= budget);
            assert!(built.metadata.truncated);
        }
    }

    #[test]
    fn test_bound_holds_for_any_history_length() {
        for n in [0, 1, 5, 50, 200] {
            let input = ComposeInput::new("Plan a trip")
                .var("region", "Jharkhand")
                .history(history(n))
                .passages(passages(4));
            let built = compose(&library(), "guide.itinerary", &input, 2_000).unwrap();
            assert!(built.char_len() <= 2_000, "history {} overflowed", n);
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let input = ComposeInput::new("Routes to Deoghar")
            .var("region", "Jharkhand")
            .history(history(3))
            .passages(passages(3));
        let a = compose(&library(), "guide.routes", &input, 1_500).unwrap();
        let b = compose(&library(), "guide.routes", &input, 1_500).unwrap();
        assert_eq!(a.user, b.user);
        assert_eq!(a.metadata, b.metadata);
    }

    #[test]
    fn test_classify_prompt_ignores_history() {
        let input = ComposeInput::new("hotels in ranchi")
            .var("labels", "hotels, faq")
            .history(history(3));
        let built = compose(&library(), "guide.classify", &input, 12_000).unwrap();
        assert_eq!(built.metadata.history_turns_used, 0);
        assert!(!built.user.contains("turn number"));
    }
}
