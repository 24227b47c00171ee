//! Attractions around a location.

use super::{bullet_lines, generate, retrieve, ChatQuery};
use crate::context::GuideContext;
use crate::intent::Intent;
use crate::records::Records;
use crate::response::{AttractionList, ChatResponse, Payload};
use crate::text::{join_natural, normalize, title_case};
use guide_prompt::ComposeInput;

/// The location asked about and what the records list for it.
///
/// Prefers a location with its own attraction list, then any known place
/// with place records, looking at the current message before earlier turns.
pub fn find_attractions(records: &Records, normalized: &str, earlier: &str) -> Option<AttractionList> {
    for text in [normalized, earlier] {
        let mentioned = records.mentioned_places(text, &[]);

        if let Some((location, items)) = mentioned
            .iter()
            .find_map(|name| records.attractions_for(name))
        {
            return Some(AttractionList {
                location: location.to_string(),
                items: items.to_vec(),
            });
        }

        for name in &mentioned {
            let items: Vec<String> = records
                .places
                .iter()
                .filter(|p| normalize(&p.location) == *name)
                .map(|p| format!("{} - {}", p.name, p.highlights.join(", ")))
                .collect();
            if !items.is_empty() {
                return Some(AttractionList {
                    location: title_case(name),
                    items,
                });
            }
        }
    }
    None
}

fn template_answer(list: &AttractionList) -> String {
    format!(
        "Top attractions around {}:\n{}",
        list.location,
        bullet_lines(&list.items)
    )
}

fn unknown_location_answer(ctx: &GuideContext) -> String {
    let known: Vec<String> = ctx.records.locations.keys().cloned().collect();
    format!(
        "I don't have attraction details for that part of {} yet. I can suggest places to visit around {}.",
        ctx.region,
        join_natural(&known)
    )
}

pub async fn handle(ctx: &GuideContext, query: &ChatQuery) -> ChatResponse {
    let list = find_attractions(&ctx.records, &query.normalized, &query.earlier);

    let grounding = match retrieve(ctx, &query.message).await {
        Ok(grounding) => grounding,
        Err(e) => {
            tracing::warn!("Attractions retrieval failed: {}", e);
            return match list {
                Some(list) => ChatResponse::degraded(Intent::Attractions, template_answer(&list), &e)
                    .with_payload(Payload::Attractions(list)),
                None => ChatResponse::degraded(Intent::Attractions, unknown_location_answer(ctx), &e),
            };
        }
    };

    let Some(list) = list else {
        if grounding.is_empty() {
            return ChatResponse::answer(Intent::Attractions, unknown_location_answer(ctx));
        }
        let input = ComposeInput::new(query.message.clone())
            .var("location", ctx.region.clone())
            .var("attractions", "none listed")
            .passages(grounding.passages);
        return match generate(ctx, "guide.attractions", query, input).await {
            Ok(answer) => {
                ChatResponse::answer(Intent::Attractions, answer).with_sources(grounding.sources)
            }
            Err(e) => {
                tracing::warn!("Attractions generation failed: {}", e);
                ChatResponse::degraded(Intent::Attractions, unknown_location_answer(ctx), &e)
            }
        };
    };

    let input = ComposeInput::new(query.message.clone())
        .var("location", list.location.clone())
        .var("attractions", list.items.join("; "))
        .passages(grounding.passages);

    match generate(ctx, "guide.attractions", query, input).await {
        Ok(answer) => ChatResponse::answer(Intent::Attractions, answer)
            .with_payload(Payload::Attractions(list))
            .with_sources(grounding.sources),
        Err(e) => {
            tracing::warn!("Attractions generation failed: {}", e);
            ChatResponse::degraded(Intent::Attractions, template_answer(&list), &e)
                .with_payload(Payload::Attractions(list))
                .with_sources(grounding.sources)
        }
    }
}
