//! Festivals and events. Answered from the records only.

use crate::intent::Intent;
use crate::records::{Festival, Records};
use crate::response::{ChatResponse, Payload};
use crate::text::contains_term;
use chrono::Datelike;

const UPCOMING_TERMS: [&str; 6] = ["upcoming", "next", "this month", "coming", "soon", "now"];

/// Which festivals answer the text: a named one, the upcoming ones for
/// `month` (1-12), or all major festivals.
pub fn select<'a>(records: &'a Records, normalized: &str, month: u32) -> (String, Vec<&'a Festival>) {
    if let Some(festival) = records.festival_named(normalized) {
        return (festival.name.clone(), vec![festival]);
    }

    if UPCOMING_TERMS.iter().any(|t| contains_term(normalized, t)) {
        let upcoming = records.upcoming_festivals(month);
        if !upcoming.is_empty() {
            return ("Festivals in the coming months".to_string(), upcoming);
        }
    }

    ("Major festivals".to_string(), records.major_festivals())
}

fn festival_line(festival: &Festival) -> String {
    let mut line = format!(
        "- {} ({}): {} in {}. Highlights: {}.",
        festival.name,
        festival.time,
        festival.kind,
        festival.locations.join(", "),
        festival.highlights.join(", ")
    );
    if let Some(ref tip) = festival.tip {
        line.push_str(&format!(" Tip: {}", tip));
    }
    line
}

pub fn answer_for(records: &Records, normalized: &str, month: u32) -> ChatResponse {
    let (title, festivals) = select(records, normalized, month);
    let lines: Vec<String> = festivals.iter().map(|f| festival_line(f)).collect();

    ChatResponse::answer(Intent::Festivals, format!("{}:\n{}", title, lines.join("\n")))
        .with_payload(Payload::Festivals(festivals.into_iter().cloned().collect()))
}

pub fn handle(records: &Records, normalized: &str) -> ChatResponse {
    answer_for(records, normalized, chrono::Local::now().month())
}
