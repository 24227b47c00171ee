//! Intent classification.
//!
//! Keyword rules are always available; the hosted model can be asked first
//! when `classifier.mode = model`, with the rules as fallback.

use crate::text::{contains_term, normalize};
use serde::Serialize;
use std::fmt;

/// What the traveller is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Itinerary,
    Attractions,
    Routes,
    Hotels,
    Helplines,
    Festivals,
    Faq,
    OutOfDomain,
}

impl Intent {
    /// Intents that reach a handler.
    pub const ROUTABLE: [Intent; 7] = [
        Intent::Itinerary,
        Intent::Attractions,
        Intent::Routes,
        Intent::Hotels,
        Intent::Helplines,
        Intent::Festivals,
        Intent::Faq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Itinerary => "itinerary",
            Intent::Attractions => "attractions",
            Intent::Routes => "routes",
            Intent::Hotels => "hotels",
            Intent::Helplines => "helplines",
            Intent::Festivals => "festivals",
            Intent::Faq => "faq",
            Intent::OutOfDomain => "out_of_domain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "itinerary" => Some(Intent::Itinerary),
            "attractions" => Some(Intent::Attractions),
            "routes" => Some(Intent::Routes),
            "hotels" => Some(Intent::Hotels),
            "helplines" => Some(Intent::Helplines),
            "festivals" => Some(Intent::Festivals),
            "faq" => Some(Intent::Faq),
            "out_of_domain" => Some(Intent::OutOfDomain),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword rules, checked in order; the first rule with a hit wins.
const KEYWORD_RULES: [(Intent, &[&str]); 6] = [
    (
        Intent::Hotels,
        &["hotel", "hotels", "stay", "stays", "accommodation", "lodge", "resort"],
    ),
    (
        Intent::Helplines,
        &["helpline", "emergency", "contact", "police", "ambulance", "hospital"],
    ),
    (
        Intent::Festivals,
        &["festival", "festivals", "event", "events", "mela", "fair"],
    ),
    (
        Intent::Routes,
        &["route", "reach", "distance", "directions", "how to get", "train", "bus"],
    ),
    (
        Intent::Itinerary,
        &["plan", "itinerary", "trip", "tour", "day", "days", "weekend"],
    ),
    (
        Intent::Attractions,
        &["near", "nearby", "around", "close", "attractions", "places", "visit"],
    ),
];

/// Classify normalized text with the keyword rules.
pub fn classify_keywords(normalized: &str) -> Intent {
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_term(normalized, k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Faq)
}

/// Comma-separated labels offered to the model, `out_of_domain` last.
pub fn model_labels() -> String {
    Intent::ROUTABLE
        .iter()
        .chain(std::iter::once(&Intent::OutOfDomain))
        .map(Intent::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read an intent out of a model reply such as "Hotels." or
/// "label: routes". Anything else is `None`.
pub fn parse_label(reply: &str) -> Option<Intent> {
    let normalized = normalize(reply);
    // Underscores normalize to spaces
    if contains_term(&normalized, "out of domain") {
        return Some(Intent::OutOfDomain);
    }
    normalized.split(' ').find_map(Intent::parse)
}
