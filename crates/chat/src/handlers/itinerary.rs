//! Day-wise trip plans.
//!
//! Places are chosen from the place records (interest categories first), two
//! per day. The plan is always returned as the `itinerary` payload; the model
//! only writes the prose around it.

use super::{bullet_lines, generate, retrieve, ChatQuery};
use crate::context::GuideContext;
use crate::intent::Intent;
use crate::records::{Place, Records};
use crate::response::{ChatResponse, ItineraryDay, Payload};
use crate::text::{contains_term, normalize};
use guide_prompt::ComposeInput;

pub const DEFAULT_DAYS: u32 = 3;
pub const MAX_DAYS: u32 = 7;
const PLACES_PER_DAY: usize = 2;

const NUMBER_WORDS: [(&str, u32); 7] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
];

const INTEREST_KEYWORDS: [(&str, &[&str]); 6] = [
    ("nature", &["nature", "natural", "scenic"]),
    ("wildlife", &["wildlife", "animal", "animals", "safari", "tiger", "elephant"]),
    ("religious", &["religious", "temple", "temples", "spiritual", "pilgrimage"]),
    ("adventure", &["adventure", "trek", "trekking", "hiking"]),
    ("waterfalls", &["waterfall", "waterfalls", "falls"]),
    ("culture", &["culture", "cultural", "tribal", "heritage"]),
];

/// Place categories an interest draws from, best match first.
fn interest_categories(interest: &str) -> &'static [&'static str] {
    match interest {
        "nature" => &["nature_wildlife", "hill_stations", "waterfalls"],
        "wildlife" => &["nature_wildlife"],
        "religious" => &["religious_sites"],
        "adventure" => &["waterfalls", "hill_stations", "nature_wildlife"],
        "waterfalls" => &["waterfalls"],
        "culture" => &["culture", "religious_sites"],
        _ => &[],
    }
}

/// Trip length from "3-day", "3 days", "three days" or "weekend".
///
/// Defaults to three days and is clamped to 1..=7.
pub fn parse_days(normalized: &str) -> u32 {
    let words: Vec<&str> = normalized.split(' ').collect();

    let explicit = words.windows(2).find_map(|pair| {
        if pair[1] != "day" && pair[1] != "days" {
            return None;
        }
        pair[0].parse::<u32>().ok().or_else(|| {
            NUMBER_WORDS
                .iter()
                .find(|(word, _)| *word == pair[0])
                .map(|(_, n)| *n)
        })
    });

    let days = match explicit {
        Some(n) => n,
        None if contains_term(normalized, "weekend") => 2,
        None => DEFAULT_DAYS,
    };
    days.clamp(1, MAX_DAYS)
}

/// Interests named in the text, in canonical order.
pub fn parse_interests(normalized: &str) -> Vec<&'static str> {
    INTEREST_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| contains_term(normalized, k)))
        .map(|(interest, _)| *interest)
        .collect()
}

/// Up to two places per day: interest categories first, then places in a
/// mentioned location, then everything else in record order.
pub fn select_places<'a>(
    records: &'a Records,
    interests: &[&str],
    days: u32,
    mentioned: &[String],
) -> Vec<&'a Place> {
    let limit = days as usize * PLACES_PER_DAY;
    let mut selected: Vec<&Place> = Vec::new();

    let take = |place: &'a Place, selected: &mut Vec<&'a Place>| {
        if selected.len() < limit && !selected.iter().any(|p| p.name == place.name) {
            selected.push(place);
        }
    };

    for interest in interests {
        for category in interest_categories(interest) {
            for place in records.places.iter().filter(|p| p.category == *category) {
                take(place, &mut selected);
            }
        }
    }

    for place in &records.places {
        let location = normalize(&place.location);
        let name = normalize(&place.name);
        if mentioned
            .iter()
            .any(|m| *m == location || contains_term(&name, m))
        {
            take(place, &mut selected);
        }
    }

    for place in &records.places {
        take(place, &mut selected);
    }

    selected
}

/// Split the selected places into `days` entries.
pub fn plan_days(places: &[&Place], days: u32) -> Vec<ItineraryDay> {
    (0..days as usize)
        .map(|i| {
            let start = (i * PLACES_PER_DAY).min(places.len());
            let end = (start + PLACES_PER_DAY).min(places.len());
            let todays = &places[start..end];

            let note = match todays.first() {
                Some(first) => {
                    let highlights: Vec<&str> =
                        first.highlights.iter().take(2).map(String::as_str).collect();
                    if highlights.is_empty() {
                        format!("Best time: {}", first.best_time)
                    } else {
                        format!("Best time: {}. Don't miss: {}", first.best_time, highlights.join(", "))
                    }
                }
                None => "Free day: explore local markets and try Dhuska or Rugra.".to_string(),
            };

            ItineraryDay {
                day: i as u32 + 1,
                places: todays.iter().map(|p| p.name.clone()).collect(),
                note,
            }
        })
        .collect()
}

fn plan_lines(plan: &[ItineraryDay]) -> String {
    bullet_lines(plan.iter().map(|day| {
        if day.places.is_empty() {
            format!("Day {}: free day", day.day)
        } else {
            format!("Day {}: {}", day.day, day.places.join(", "))
        }
    }))
}

/// Itinerary written from the plan alone, used when generation is not possible.
pub fn template_answer(region: &str, plan: &[ItineraryDay]) -> String {
    let mut answer = format!("Your {}-day {} itinerary:\n", plan.len(), region);
    for day in plan {
        if day.places.is_empty() {
            answer.push_str(&format!("\nDay {}: {}", day.day, day.note));
        } else {
            answer.push_str(&format!(
                "\nDay {}: {}\n  {}",
                day.day,
                day.places.join(" and "),
                day.note
            ));
        }
    }
    answer
}

pub async fn handle(ctx: &GuideContext, query: &ChatQuery) -> ChatResponse {
    let days = parse_days(&query.normalized);
    let interests = parse_interests(&query.normalized);
    let mentioned = ctx.records.mentioned_places(&query.normalized, &[]);

    let places = select_places(&ctx.records, &interests, days, &mentioned);
    let plan = plan_days(&places, days);
    tracing::debug!(days, ?interests, places = places.len(), "Itinerary planned");

    let fallback = template_answer(&ctx.region, &plan);
    let payload = Payload::Itinerary(plan.clone());

    let grounding = match retrieve(ctx, &query.message).await {
        Ok(grounding) => grounding,
        Err(e) => {
            tracing::warn!("Itinerary retrieval failed: {}", e);
            return ChatResponse::degraded(Intent::Itinerary, fallback, &e).with_payload(payload);
        }
    };

    let input = ComposeInput::new(query.message.clone())
        .var("days", days.to_string())
        .var("interests", interests.join(", "))
        .var("plan", plan_lines(&plan))
        .passages(grounding.passages);

    match generate(ctx, "guide.itinerary", query, input).await {
        Ok(answer) => ChatResponse::answer(Intent::Itinerary, answer)
            .with_payload(payload)
            .with_sources(grounding.sources),
        Err(e) => {
            tracing::warn!("Itinerary generation failed: {}", e);
            ChatResponse::degraded(Intent::Itinerary, fallback, &e)
                .with_payload(payload)
                .with_sources(grounding.sources)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Records {
        Records::builtin().unwrap()
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_days(&normalize("Plan a 3-day trip to Ranchi")), 3);
        assert_eq!(parse_days(&normalize("5 days in Jharkhand")), 5);
        assert_eq!(parse_days(&normalize("two day tour")), 2);
        assert_eq!(parse_days(&normalize("a weekend in Netarhat")), 2);
        assert_eq!(parse_days(&normalize("plan my trip")), DEFAULT_DAYS);
        assert_eq!(parse_days(&normalize("a 20 day tour")), MAX_DAYS);
        assert_eq!(parse_days(&normalize("0 days")), 1);
    }

    #[test]
    fn test_parse_interests() {
        assert_eq!(
            parse_interests(&normalize("Temples and waterfalls, maybe a safari")),
            vec!["wildlife", "religious", "waterfalls"]
        );
        assert!(parse_interests(&normalize("plan a trip")).is_empty());
    }

    #[test]
    fn test_interest_places_come_first() {
        let records = records();
        let places = select_places(&records, &["religious"], 2, &[]);

        assert_eq!(places.len(), 4);
        assert!(places[..3].iter().all(|p| p.category == "religious_sites"));
    }

    #[test]
    fn test_mentioned_location_before_the_rest() {
        let records = records();
        let places = select_places(&records, &[], 1, &["jamshedpur".to_string()]);
        assert_eq!(places[0].location, "Jamshedpur");
    }

    #[test]
    fn test_no_duplicate_places() {
        let records = records();
        let places = select_places(&records, &["nature", "adventure", "wildlife"], 7, &[]);
        let mut names: Vec<_> = places.iter().map(|p| &p.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), places.len());
    }

    #[test]
    fn test_plan_has_one_entry_per_day() {
        let records = records();
        let places = select_places(&records, &[], 3, &[]);
        let plan = plan_days(&places, 3);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].day, 1);
        assert_eq!(plan[2].day, 3);
        assert!(plan.iter().all(|d| d.places.len() == 2));
    }

    #[test]
    fn test_plan_pads_days_without_places() {
        let records = records();
        let places: Vec<&Place> = records.places.iter().take(3).collect();
        let plan = plan_days(&places, 3);

        assert_eq!(plan[1].places.len(), 1);
        assert!(plan[2].places.is_empty());
        assert!(plan[2].note.starts_with("Free day"));
    }

    #[test]
    fn test_template_answer_lists_every_day() {
        let records = records();
        let places = select_places(&records, &[], 2, &[]);
        let answer = template_answer("Jharkhand", &plan_days(&places, 2));

        assert!(answer.starts_with("Your 2-day Jharkhand itinerary"));
        assert!(answer.contains("Day 1:"));
        assert!(answer.contains("Day 2:"));
    }
}
