//! Response router: guard, classify, dispatch.

use crate::context::GuideContext;
use crate::guard::GuardDecision;
use crate::handlers::{self, ChatQuery};
use crate::intent::{classify_keywords, model_labels, parse_label, Intent};
use crate::response::{ChatRequest, ChatResponse};
use crate::text::join_natural;
use guide_core::config::ClassifierMode;
use guide_prompt::{compose, ComposeInput};
use std::sync::Arc;
use tracing::Instrument;

/// Turns each chat request into exactly one response.
#[derive(Debug, Clone)]
pub struct ChatService {
    ctx: Arc<GuideContext>,
}

impl ChatService {
    pub fn new(ctx: Arc<GuideContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &GuideContext {
        &self.ctx
    }

    pub async fn handle(&self, request: &ChatRequest) -> ChatResponse {
        let span = tracing::info_span!("chat", intent = tracing::field::Empty);
        self.route(request).instrument(span).await
    }

    async fn route(&self, request: &ChatRequest) -> ChatResponse {
        let ctx = self.ctx.as_ref();
        let query = ChatQuery::from_request(request);

        // The deny list runs before anything that could reach the model
        if let GuardDecision::OutOfDomain { matched } = ctx.guard.screen(&query.normalized) {
            return self.reject(matched);
        }

        let intent = self.classify(&query).await;
        tracing::Span::current().record("intent", intent.as_str());

        if let GuardDecision::OutOfDomain { matched } =
            ctx.guard.screen_intent(&query.normalized, &query.earlier, intent)
        {
            return self.reject(matched);
        }

        let response = match intent {
            Intent::Itinerary => handlers::itinerary::handle(ctx, &query).await,
            Intent::Attractions => handlers::attractions::handle(ctx, &query).await,
            Intent::Routes => handlers::routes::handle(ctx, &query).await,
            Intent::Hotels => handlers::hotels::handle(ctx, &query).await,
            Intent::Helplines => handlers::helplines::handle(&ctx.records, &query.normalized),
            Intent::Festivals => handlers::festivals::handle(&ctx.records, &query.normalized),
            Intent::Faq => handlers::faq::handle(ctx, &query).await,
            Intent::OutOfDomain => self.reject(None),
        };

        tracing::info!(
            degraded = response.degraded,
            sources = response.sources.len(),
            "Chat answered"
        );
        response
    }

    async fn classify(&self, query: &ChatQuery) -> Intent {
        let keyword_intent = classify_keywords(&query.normalized);
        if self.ctx.classifier == ClassifierMode::Keyword {
            return keyword_intent;
        }

        match self.classify_with_model(query).await {
            Some(intent) => intent,
            None => {
                tracing::debug!("Model label unusable; keyword rules chose {}", keyword_intent);
                keyword_intent
            }
        }
    }

    async fn classify_with_model(&self, query: &ChatQuery) -> Option<Intent> {
        let ctx = self.ctx.as_ref();
        let input = ComposeInput::new(query.message.clone())
            .var("region", ctx.region.clone())
            .var("labels", model_labels());

        let prompt = match compose(&ctx.prompts, "guide.classify", &input, ctx.max_input_chars) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!("Classifier prompt failed: {}", e);
                return None;
            }
        };

        match ctx.generator.generate_raw(&prompt).await {
            Ok(reply) => parse_label(&reply),
            Err(e) => {
                tracing::warn!("Model classification failed: {}", e);
                None
            }
        }
    }

    fn reject(&self, matched: Option<String>) -> ChatResponse {
        let ctx = self.ctx.as_ref();
        tracing::info!(matched = matched.as_deref().unwrap_or("-"), "Query outside the region");

        let highlights = ctx.records.highlight_names(3);
        let mut answer = format!(
            "I specialize in {region} tourism and can only help with destinations within {region}.",
            region = ctx.region
        );
        if !highlights.is_empty() {
            answer.push_str(&format!(
                " However, {} has amazing attractions like {}. Would you like to explore these instead?",
                ctx.region,
                join_natural(&highlights)
            ));
        }
        ChatResponse::rejected(answer)
    }
}
