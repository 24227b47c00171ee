//! Directions between two places.

use super::{generate, retrieve, ChatQuery};
use crate::context::GuideContext;
use crate::intent::Intent;
use crate::records::{Records, RouteInfo};
use crate::response::{ChatResponse, Payload};
use crate::text::{normalize, term_position, title_case};
use guide_prompt::ComposeInput;

/// Where journeys start when the traveller names only a destination.
const DEFAULT_ORIGIN: &str = "ranchi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub origin: Option<String>,
    pub destination: Option<String>,
}

/// Origin and destination from known places in order of mention.
///
/// "from X" marks X as the origin wherever it appears. A single place is
/// the destination; the origin then defaults to Ranchi.
pub fn detect_endpoints(records: &Records, normalized: &str, extra: &[String], region: &str) -> Endpoints {
    let region = normalize(region);
    let places: Vec<String> = records
        .mentioned_places(normalized, extra)
        .into_iter()
        .filter(|p| *p != region)
        .collect();

    let from_origin = term_position(normalized, "from").and_then(|from| {
        places
            .iter()
            .find(|p| term_position(normalized, p) == Some(from + 1))
            .cloned()
    });

    let (origin, destination) = match from_origin {
        Some(origin) => {
            let destination = places.iter().find(|p| **p != origin).cloned();
            (Some(origin), destination)
        }
        None => match places.as_slice() {
            [] => (None, None),
            [only] if only == DEFAULT_ORIGIN => (None, Some(only.clone())),
            [only] => (Some(DEFAULT_ORIGIN.to_string()), Some(only.clone())),
            [first, second, ..] => (Some(first.clone()), Some(second.clone())),
        },
    };

    Endpoints { origin, destination }
}

fn route_facts(route: &RouteInfo) -> String {
    let mut facts = format!(
        "Distance: {}\nTravel time: {}\nVia: {}\nModes: {}",
        route.distance,
        route.duration,
        route.via,
        route.modes.join(", ")
    );
    if !route.landmarks.is_empty() {
        facts.push_str(&format!("\nLandmarks: {}", route.landmarks.join(", ")));
    }
    facts
}

fn template_answer(route: &RouteInfo) -> String {
    format!(
        "{} to {}: about {} ({}) via {}. Options: {}.{}",
        route.origin,
        route.destination,
        route.distance,
        route.duration,
        route.via,
        route.modes.join(", "),
        if route.landmarks.is_empty() {
            String::new()
        } else {
            format!(" You will pass {}.", route.landmarks.join(" and "))
        }
    )
}

fn unknown_route_answer(region: &str, origin: &str, destination: &str) -> String {
    format!(
        "I don't have route details from {} to {} yet. State buses and IRCTC trains connect most towns in {}; check the latest timings before you travel.",
        origin, destination, region
    )
}

pub async fn handle(ctx: &GuideContext, query: &ChatQuery) -> ChatResponse {
    let endpoints = detect_endpoints(
        &ctx.records,
        &query.normalized,
        ctx.guard.allow_terms(),
        &ctx.region,
    );

    let Some(destination) = endpoints.destination else {
        return ChatResponse::answer(
            Intent::Routes,
            format!(
                "Where would you like to go? Tell me your starting point and destination in {}, for example \"from Ranchi to Netarhat\".",
                ctx.region
            ),
        );
    };
    let route = endpoints
        .origin
        .as_ref()
        .and_then(|origin| ctx.records.find_route(origin, &destination));
    let (origin_name, destination_name) = match route {
        Some(ref r) => (r.origin.clone(), r.destination.clone()),
        None => (
            endpoints
                .origin
                .as_deref()
                .map(title_case)
                .unwrap_or_else(|| format!("anywhere in {}", ctx.region)),
            title_case(&destination),
        ),
    };
    tracing::debug!(origin = %origin_name, destination = %destination_name, known = route.is_some(), "Route request");

    let grounding = match retrieve(ctx, &query.message).await {
        Ok(grounding) => grounding,
        Err(e) => {
            tracing::warn!("Route retrieval failed: {}", e);
            return match route {
                Some(route) => ChatResponse::degraded(Intent::Routes, template_answer(&route), &e)
                    .with_payload(Payload::Route(route)),
                None => ChatResponse::degraded(
                    Intent::Routes,
                    unknown_route_answer(&ctx.region, &origin_name, &destination_name),
                    &e,
                ),
            };
        }
    };

    if route.is_none() && grounding.is_empty() {
        return ChatResponse::answer(
            Intent::Routes,
            unknown_route_answer(&ctx.region, &origin_name, &destination_name),
        );
    }

    let input = ComposeInput::new(query.message.clone())
        .var("origin", origin_name.clone())
        .var("destination", destination_name.clone())
        .var("route", route.as_ref().map(route_facts).unwrap_or_default())
        .passages(grounding.passages);

    let response = match generate(ctx, "guide.routes", query, input).await {
        Ok(answer) => ChatResponse::answer(Intent::Routes, answer),
        Err(e) => {
            tracing::warn!("Route generation failed: {}", e);
            let fallback = match route {
                Some(ref route) => template_answer(route),
                None => {
                    unknown_route_answer(&ctx.region, &origin_name, &destination_name)
                }
            };
            ChatResponse::degraded(Intent::Routes, fallback, &e)
        }
    };

    let response = response.with_sources(grounding.sources);
    match route {
        Some(route) => response.with_payload(Payload::Route(route)),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Endpoints {
        let records = Records::builtin().unwrap();
        let extra = vec!["gumla".to_string(), "jharkhand".to_string()];
        detect_endpoints(&records, &normalize(text), &extra, "Jharkhand")
    }

    fn endpoints(origin: Option<&str>, destination: Option<&str>) -> Endpoints {
        Endpoints {
            origin: origin.map(str::to_string),
            destination: destination.map(str::to_string),
        }
    }

    #[test]
    fn test_order_of_mention() {
        assert_eq!(
            detect("Ranchi to Deoghar route"),
            endpoints(Some("ranchi"), Some("deoghar"))
        );
    }

    #[test]
    fn test_from_marks_origin() {
        assert_eq!(
            detect("How to get to Netarhat from Jamshedpur?"),
            endpoints(Some("jamshedpur"), Some("netarhat"))
        );
    }

    #[test]
    fn test_single_place_defaults_origin() {
        assert_eq!(
            detect("How do I reach Betla in Jharkhand?"),
            endpoints(Some("ranchi"), Some("betla"))
        );
        assert_eq!(detect("distance to Ranchi"), endpoints(None, Some("ranchi")));
    }

    #[test]
    fn test_allow_terms_extend_vocabulary() {
        assert_eq!(
            detect("bus from Gumla to Ranchi"),
            endpoints(Some("gumla"), Some("ranchi"))
        );
    }

    #[test]
    fn test_no_destination() {
        assert_eq!(detect("which bus should I take?"), endpoints(None, None));
        assert_eq!(detect("route from Ranchi"), endpoints(Some("ranchi"), None));
    }

    #[test]
    fn test_template_answer_mentions_distance() {
        let records = Records::builtin().unwrap();
        let route = records.find_route("netarhat", "ranchi").unwrap();
        let answer = template_answer(&route);
        assert!(answer.starts_with("Netarhat to Ranchi"));
        assert!(answer.contains("150 km"));
    }

    #[test]
    fn test_unknown_route_answer_names_configured_region() {
        let answer = unknown_route_answer("Odisha", "Puri", "Konark");
        assert!(answer.contains("from Puri to Konark"));
        assert!(answer.contains("most towns in Odisha"));
        assert!(!answer.contains("Jharkhand"));
    }
}
