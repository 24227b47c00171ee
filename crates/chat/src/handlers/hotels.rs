//! Accommodation.
//!
//! A known location is answered straight from the hotel records. Anything
//! else goes through retrieval and generation with every hotel record as
//! context.

use super::{bullet_lines, generate, retrieve, ChatQuery};
use crate::context::GuideContext;
use crate::intent::Intent;
use crate::records::{HotelEntry, Records};
use crate::response::{ChatResponse, Payload};
use crate::text::{contains_term, join_natural};
use guide_prompt::ComposeInput;

const TIER_KEYWORDS: [(&str, &[&str]); 3] = [
    ("budget", &["budget", "cheap", "affordable", "economy"]),
    ("luxury", &["luxury", "premium", "5 star", "five star"]),
    ("mid_range", &["mid range", "midrange", "moderate"]),
];

fn tier_label(tier: &str) -> &str {
    match tier {
        "luxury" => "Luxury",
        "mid_range" => "Mid-range",
        "budget" => "Budget",
        other => other,
    }
}

/// Hotels for the first mentioned location that has any, filtered by a
/// requested price tier when that leaves something.
pub fn find_hotels(records: &Records, normalized: &str, earlier: &str) -> Option<(String, Vec<HotelEntry>)> {
    let location = [normalized, earlier].iter().find_map(|text| {
        records
            .mentioned_places(text, &[])
            .into_iter()
            .find(|place| !records.hotels_in(place).is_empty())
    })?;

    let hotels: Vec<HotelEntry> = records.hotels_in(&location).into_iter().cloned().collect();
    let display = hotels
        .first()
        .map(|h| h.location.clone())
        .unwrap_or_else(|| location.clone());

    let tier = TIER_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_term(normalized, k)))
        .map(|(tier, _)| *tier);

    let filtered: Vec<HotelEntry> = match tier {
        Some(tier) => hotels.iter().filter(|h| h.tier == tier).cloned().collect(),
        None => Vec::new(),
    };

    if filtered.is_empty() {
        Some((display, hotels))
    } else {
        Some((display, filtered))
    }
}

fn hotel_line(hotel: &HotelEntry) -> String {
    format!(
        "{} ({}): {}. Book: {}",
        hotel.name,
        tier_label(&hotel.tier),
        hotel.price_range,
        hotel.link
    )
}

pub fn records_answer(location: &str, hotels: &[HotelEntry]) -> String {
    format!(
        "Places to stay in {}:\n{}\n\nBook early for weekends and festival season.",
        location,
        bullet_lines(hotels.iter().map(hotel_line))
    )
}

fn locations_answer(ctx: &GuideContext) -> String {
    format!(
        "I can suggest hotels in {}. Which town are you planning to stay in?",
        join_natural(&ctx.records.hotel_locations())
    )
}

pub async fn handle(ctx: &GuideContext, query: &ChatQuery) -> ChatResponse {
    if let Some((location, hotels)) = find_hotels(&ctx.records, &query.normalized, &query.earlier) {
        tracing::debug!(location = %location, count = hotels.len(), "Hotels answered from records");
        return ChatResponse::answer(Intent::Hotels, records_answer(&location, &hotels))
            .with_payload(Payload::Hotels(hotels));
    }

    let grounding = match retrieve(ctx, &query.message).await {
        Ok(grounding) => grounding,
        Err(e) => {
            tracing::warn!("Hotel retrieval failed: {}", e);
            return ChatResponse::degraded(Intent::Hotels, locations_answer(ctx), &e);
        }
    };

    let all_hotels = bullet_lines(ctx.records.hotels.iter().map(|h| format!("{}, {}", h.location, hotel_line(h))));
    let input = ComposeInput::new(query.message.clone())
        .var("hotels", all_hotels)
        .passages(grounding.passages);

    match generate(ctx, "guide.hotels", query, input).await {
        Ok(answer) => ChatResponse::answer(Intent::Hotels, answer).with_sources(grounding.sources),
        Err(e) => {
            tracing::warn!("Hotel generation failed: {}", e);
            ChatResponse::degraded(Intent::Hotels, locations_answer(ctx), &e)
        }
    }
}
