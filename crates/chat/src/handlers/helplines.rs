//! Helpline numbers. Answered from the records only.

use crate::intent::Intent;
use crate::records::{Helpline, Records};
use crate::response::{ChatResponse, Payload};
use crate::text::{contains_term, title_case};

const CATEGORY_KEYWORDS: [(&str, &[&str]); 4] = [
    ("emergency", &["emergency", "police", "ambulance", "fire", "women", "child", "sos"]),
    ("medical", &["medical", "hospital", "doctor", "health", "clinic"]),
    ("tourism", &["tourism", "tourist", "forest", "guide", "tour"]),
    ("transport", &["transport", "railway", "train", "highway", "airport", "road", "bus"]),
];

const DEFAULT_CATEGORIES: [&str; 2] = ["emergency", "tourism"];

/// Categories the text asks for, or emergency and tourism by default.
pub fn select_categories(normalized: &str) -> Vec<&'static str> {
    let chosen: Vec<&'static str> = CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| contains_term(normalized, k)))
        .map(|(category, _)| *category)
        .collect();

    if chosen.is_empty() {
        DEFAULT_CATEGORIES.to_vec()
    } else {
        chosen
    }
}

pub fn handle(records: &Records, normalized: &str) -> ChatResponse {
    let categories = select_categories(normalized);

    let mut selected: Vec<Helpline> = Vec::new();
    let mut sections = Vec::new();
    for category in &categories {
        let lines: Vec<String> = records
            .helplines_in(category)
            .into_iter()
            .map(|h| {
                selected.push(h.clone());
                format!("- {}: {}", h.service, h.number)
            })
            .collect();
        if !lines.is_empty() {
            sections.push(format!("{} helplines:\n{}", title_case(category), lines.join("\n")));
        }
    }

    let answer = if sections.is_empty() {
        "Dial 112 for any emergency anywhere in India.".to_string()
    } else {
        format!("{}\n\nDial 112 for any emergency.", sections.join("\n\n"))
    };

    ChatResponse::answer(Intent::Helplines, answer).with_payload(Payload::Helplines(selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;

    #[test]
    fn test_default_categories() {
        assert_eq!(select_categories(&normalize("helpline numbers please")), vec!["emergency", "tourism"]);
    }

    #[test]
    fn test_keyword_categories() {
        assert_eq!(select_categories(&normalize("nearest hospital contact")), vec!["medical"]);
        assert_eq!(
            select_categories(&normalize("railway and police numbers")),
            vec!["emergency", "transport"]
        );
    }

    #[test]
    fn test_answer_lists_numbers() {
        let records = Records::builtin().unwrap();
        let response = handle(&records, &normalize("emergency contact"));

        assert_eq!(response.intent, Intent::Helplines);
        assert!(response.answer.contains("Police: 100"));
        match response.payload {
            Some(Payload::Helplines(list)) => {
                assert!(!list.is_empty());
                assert!(list.iter().all(|h| h.category == "emergency"));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
