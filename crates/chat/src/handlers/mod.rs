//! Intent handlers.
//!
//! Each handler turns one classified query into exactly one `ChatResponse`.
//! Generating handlers share the retrieve, compose and generate steps below.

pub mod attractions;
pub mod faq;
pub mod festivals;
pub mod helplines;
pub mod hotels;
pub mod itinerary;
pub mod routes;

use crate::context::GuideContext;
use crate::response::{ChatRequest, Role};
use crate::text::normalize;
use guide_core::AppResult;
use guide_knowledge::rag::source_name;
use guide_knowledge::{source_refs, SourceRef};
use guide_prompt::{compose, ComposeInput, ContextPassage, HistoryTurn};

/// A request prepared for matching and prompting.
#[derive(Debug, Clone)]
pub struct ChatQuery {
    pub message: String,
    pub normalized: String,
    /// Normalized text of the earlier user turns, most recent first
    pub earlier: String,
    pub history: Vec<HistoryTurn>,
}

impl ChatQuery {
    pub fn from_request(request: &ChatRequest) -> Self {
        let earlier = request
            .history
            .iter()
            .rev()
            .filter(|turn| turn.role == Role::User)
            .map(|turn| normalize(&turn.content))
            .collect::<Vec<_>>()
            .join(" ");

        let history = request
            .history
            .iter()
            .map(|turn| HistoryTurn::new(turn.role.as_str(), turn.content.clone()))
            .collect();

        Self {
            message: request.message.trim().to_string(),
            normalized: normalize(&request.message),
            earlier,
            history,
        }
    }
}

/// Retrieved passages ready for a prompt, plus their user-facing references.
#[derive(Debug, Clone, Default)]
pub(crate) struct Grounding {
    pub passages: Vec<ContextPassage>,
    pub sources: Vec<SourceRef>,
}

impl Grounding {
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

pub(crate) async fn retrieve(ctx: &GuideContext, text: &str) -> AppResult<Grounding> {
    let result = ctx.retriever.retrieve(text).await?;

    let passages = result
        .chunks
        .iter()
        .map(|scored| ContextPassage::new(source_name(&scored.chunk), scored.chunk.text.clone()))
        .collect();

    Ok(Grounding {
        passages,
        sources: source_refs(&result),
    })
}

/// Compose `prompt_id` with the query's history and generate an answer.
pub(crate) async fn generate(
    ctx: &GuideContext,
    prompt_id: &str,
    query: &ChatQuery,
    input: ComposeInput,
) -> AppResult<String> {
    let input = input
        .var("region", ctx.region.clone())
        .history(query.history.clone());
    let prompt = compose(&ctx.prompts, prompt_id, &input, ctx.max_input_chars)?;

    tracing::debug!(
        prompt_id,
        chars = prompt.char_len(),
        passages = prompt.metadata.passages_used,
        truncated = prompt.metadata.truncated,
        "Prompt composed"
    );

    ctx.generator.generate(&prompt).await
}

/// Render a list as "- item" lines.
pub(crate) fn bullet_lines<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
