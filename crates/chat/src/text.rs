//! Text helpers shared by the guard, the classifier and the handlers.
//!
//! Matching works on normalized text: lowercase words separated by single
//! spaces, with every non-alphanumeric character treated as a separator.

/// Lowercase `text` and reduce it to space-separated words.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word offset of the first whole-word occurrence of `term` in `normalized`.
///
/// `term` may be several words ("how to get"); it is normalized first.
pub fn term_position(normalized: &str, term: &str) -> Option<usize> {
    let term = normalize(term);
    if term.is_empty() {
        return None;
    }

    let haystack = format!(" {} ", normalized);
    let needle = format!(" {} ", term);
    haystack
        .find(&needle)
        .map(|byte_pos| haystack[..byte_pos + 1].split_whitespace().count())
}

/// Whether `term` occurs in `normalized` as whole words.
pub fn contains_term(normalized: &str, term: &str) -> bool {
    term_position(normalized, term).is_some()
}

/// First term of `terms` found in `normalized`.
pub fn first_match<'a, S: AsRef<str>>(normalized: &str, terms: &'a [S]) -> Option<&'a str> {
    terms
        .iter()
        .map(AsRef::as_ref)
        .find(|term| contains_term(normalized, term))
}

/// Cap `text` at `limit` words, appending "..." when anything was cut.
///
/// Formatting before the cut (line breaks, bullets) is kept as is.
pub fn truncate_words(text: &str, limit: usize) -> String {
    let mut count = 0;
    let mut in_word = false;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            in_word = true;
            if count == limit {
                return format!("{}...", text[..i].trim_end());
            }
            count += 1;
        }
    }

    text.to_string()
}

/// "jamshedpur" -> "Jamshedpur", "betla national park" -> "Betla National Park".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join items as "a, b and c".
pub fn join_natural(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hotels near NETARHAT?! "), "hotels near netarhat");
        assert_eq!(normalize("3-day trip"), "3 day trip");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_whole_word_matching() {
        let text = normalize("What's a good goal for my trip?");
        assert!(!contains_term(&text, "goa"));
        assert!(contains_term(&text, "goal"));
        assert!(contains_term(&normalize("Trip to Goa"), "goa"));
    }

    #[test]
    fn test_multi_word_terms() {
        let text = normalize("How to get to Betla from Ranchi");
        assert!(contains_term(&text, "how to get"));
        assert!(contains_term(&text, "How To Get"));
        assert!(!contains_term(&text, "how to reach"));
        assert!(contains_term(&normalize("Flights to New York"), "new york"));
    }

    #[test]
    fn test_term_position_is_word_offset() {
        let text = normalize("from deoghar to ranchi");
        assert_eq!(term_position(&text, "from"), Some(0));
        assert_eq!(term_position(&text, "deoghar"), Some(1));
        assert_eq!(term_position(&text, "ranchi"), Some(3));
        assert_eq!(term_position(&text, ""), None);
    }

    #[test]
    fn test_first_match_respects_term_order() {
        let terms = vec!["hotel".to_string(), "stay".to_string()];
        assert_eq!(first_match(&normalize("stay at a hotel"), &terms), Some("hotel"));
        assert_eq!(first_match(&normalize("nothing here"), &terms), None);
    }

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("one two three", 3), "one two three");
        assert_eq!(truncate_words("one two three four", 2), "one two...");
        assert_eq!(truncate_words("Day 1:\n- Ranchi\nDay 2:", 4), "Day 1:\n- Ranchi...");
        assert_eq!(truncate_words("trailing   ", 1), "trailing   ");
    }

    #[test]
    fn test_title_case_and_join() {
        assert_eq!(title_case("betla national park"), "Betla National Park");
        assert_eq!(join_natural(&["a".to_string()]), "a");
        assert_eq!(
            join_natural(&["a".to_string(), "b".to_string(), "c".to_string()]),
            "a, b and c"
        );
    }
}
