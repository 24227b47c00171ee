//! Open questions answered from retrieved passages only.

use super::{generate, retrieve, ChatQuery};
use crate::context::GuideContext;
use crate::intent::Intent;
use crate::response::ChatResponse;
use guide_prompt::ComposeInput;

fn no_information(region: &str) -> String {
    format!(
        "I don't have information about that in my {} travel guides. Try asking about attractions, routes, hotels, festivals or a trip plan.",
        region
    )
}

const SERVICE_DEGRADED: &str = "I can't reach my travel guides right now, so I can't answer that reliably. Please try again in a moment. Hotels, helplines and festivals are still available.";

pub async fn handle(ctx: &GuideContext, query: &ChatQuery) -> ChatResponse {
    let grounding = match retrieve(ctx, &query.message).await {
        Ok(grounding) => grounding,
        Err(e) => {
            tracing::warn!("FAQ retrieval failed: {}", e);
            return ChatResponse::degraded(Intent::Faq, SERVICE_DEGRADED, &e);
        }
    };

    if grounding.is_empty() {
        tracing::debug!("No passages above threshold; answering without generation");
        return ChatResponse::answer(Intent::Faq, no_information(&ctx.region));
    }

    let input = ComposeInput::new(query.message.clone()).passages(grounding.passages);

    match generate(ctx, "guide.faq", query, input).await {
        Ok(answer) => ChatResponse::answer(Intent::Faq, answer).with_sources(grounding.sources),
        Err(e) => {
            tracing::warn!("FAQ generation failed: {}", e);
            ChatResponse::degraded(Intent::Faq, SERVICE_DEGRADED, &e)
        }
    }
}
