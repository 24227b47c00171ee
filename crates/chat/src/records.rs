//! Structured tourism records: hotels, helplines, festivals, places, routes
//! and per-location attractions.
//!
//! Each set is read from `<data_dir>/<name>.json`. A missing file falls back
//! to the built-in set; a file that exists but does not parse is fatal.

use crate::text::{normalize, term_position};
use guide_core::{AppConfig, AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelEntry {
    pub name: String,
    pub location: String,
    /// "luxury", "mid_range" or "budget"
    pub tier: String,
    pub price_range: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Helpline {
    pub category: String,
    pub service: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Festival {
    pub name: String,
    /// Display form, e.g. "March-April"
    pub time: String,
    /// Calendar months (1-12) the festival usually falls in
    pub months: Vec<u32>,
    pub kind: String,
    pub locations: Vec<String>,
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    /// Minor cultural events are left out of the general overview
    #[serde(default = "default_true")]
    pub major: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub name: String,
    /// nature_wildlife, waterfalls, hill_stations, religious_sites, culture
    pub category: String,
    pub location: String,
    pub best_time: String,
    pub duration: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteInfo {
    pub origin: String,
    pub destination: String,
    pub distance: String,
    pub duration: String,
    pub via: String,
    pub modes: Vec<String>,
    pub landmarks: Vec<String>,
}

impl RouteInfo {
    /// The same route travelled the other way.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.destination.clone(),
            destination: self.origin.clone(),
            landmarks: self.landmarks.iter().rev().cloned().collect(),
            ..self.clone()
        }
    }
}

/// All structured records, immutable while serving.
#[derive(Debug, Clone, Default)]
pub struct Records {
    pub hotels: Vec<HotelEntry>,
    pub helplines: Vec<Helpline>,
    pub festivals: Vec<Festival>,
    pub places: Vec<Place>,
    pub routes: Vec<RouteInfo>,
    /// Display location name -> attraction lines
    pub locations: BTreeMap<String, Vec<String>>,
}

const BUILTIN_HOTELS: &str = include_str!("../records/hotels.json");
const BUILTIN_HELPLINES: &str = include_str!("../records/helplines.json");
const BUILTIN_FESTIVALS: &str = include_str!("../records/festivals.json");
const BUILTIN_PLACES: &str = include_str!("../records/places.json");
const BUILTIN_ROUTES: &str = include_str!("../records/routes.json");
const BUILTIN_LOCATIONS: &str = include_str!("../records/locations.json");

impl Records {
    /// The record sets compiled into the binary.
    pub fn builtin() -> AppResult<Self> {
        Ok(Self {
            hotels: parse_builtin("hotels", BUILTIN_HOTELS)?,
            helplines: parse_builtin("helplines", BUILTIN_HELPLINES)?,
            festivals: parse_builtin("festivals", BUILTIN_FESTIVALS)?,
            places: parse_builtin("places", BUILTIN_PLACES)?,
            routes: parse_builtin("routes", BUILTIN_ROUTES)?,
            locations: parse_builtin("locations", BUILTIN_LOCATIONS)?,
        })
    }

    /// Load every record set from the data directory.
    pub fn load(config: &AppConfig) -> AppResult<Self> {
        let records = Self {
            hotels: load_or_builtin(&config.record_path("hotels"), "hotels", BUILTIN_HOTELS)?,
            helplines: load_or_builtin(
                &config.record_path("helplines"),
                "helplines",
                BUILTIN_HELPLINES,
            )?,
            festivals: load_or_builtin(
                &config.record_path("festivals"),
                "festivals",
                BUILTIN_FESTIVALS,
            )?,
            places: load_or_builtin(&config.record_path("places"), "places", BUILTIN_PLACES)?,
            routes: load_or_builtin(&config.record_path("routes"), "routes", BUILTIN_ROUTES)?,
            locations: load_or_builtin(
                &config.record_path("locations"),
                "locations",
                BUILTIN_LOCATIONS,
            )?,
        };

        tracing::info!(
            hotels = records.hotels.len(),
            helplines = records.helplines.len(),
            festivals = records.festivals.len(),
            places = records.places.len(),
            routes = records.routes.len(),
            locations = records.locations.len(),
            "Structured records loaded"
        );

        Ok(records)
    }

    /// Hotels whose location is `location` (case-insensitive).
    pub fn hotels_in(&self, location: &str) -> Vec<&HotelEntry> {
        let wanted = normalize(location);
        self.hotels
            .iter()
            .filter(|h| normalize(&h.location) == wanted)
            .collect()
    }

    /// Distinct hotel locations, in file order.
    pub fn hotel_locations(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for hotel in &self.hotels {
            if !seen.iter().any(|s: &String| s.eq_ignore_ascii_case(&hotel.location)) {
                seen.push(hotel.location.clone());
            }
        }
        seen
    }

    /// Attraction lines for a location key (case-insensitive).
    pub fn attractions_for(&self, location: &str) -> Option<(&str, &[String])> {
        let wanted = normalize(location);
        self.locations
            .iter()
            .find(|(name, _)| normalize(name) == wanted)
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    /// Route between two places in either direction, oriented as asked.
    pub fn find_route(&self, origin: &str, destination: &str) -> Option<RouteInfo> {
        let (o, d) = (normalize(origin), normalize(destination));
        self.routes.iter().find_map(|r| {
            let (ro, rd) = (normalize(&r.origin), normalize(&r.destination));
            if ro == o && rd == d {
                Some(r.clone())
            } else if ro == d && rd == o {
                Some(r.reversed())
            } else {
                None
            }
        })
    }

    /// Every place name the records know about, for mention detection.
    pub fn place_vocabulary(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let candidates = self
            .routes
            .iter()
            .flat_map(|r| [r.origin.clone(), r.destination.clone()])
            .chain(self.locations.keys().cloned())
            .chain(self.hotels.iter().map(|h| h.location.clone()))
            .chain(self.places.iter().map(|p| p.location.clone()));

        for name in candidates {
            let name = normalize(&name);
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Known places in the order the text mentions them.
    pub fn mentioned_places(&self, normalized: &str, extra: &[String]) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();
        for name in self.place_vocabulary().into_iter().chain(extra.iter().map(|e| normalize(e))) {
            if found.iter().any(|(_, n)| *n == name) {
                continue;
            }
            if let Some(pos) = term_position(normalized, &name) {
                found.push((pos, name));
            }
        }
        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, name)| name).collect()
    }

    /// A festival named in the text.
    pub fn festival_named(&self, normalized: &str) -> Option<&Festival> {
        self.festivals
            .iter()
            .find(|f| term_position(normalized, &f.name).is_some())
    }

    /// Festivals falling in `month` or the following two months.
    pub fn upcoming_festivals(&self, month: u32) -> Vec<&Festival> {
        let window: Vec<u32> = (0..3).map(|i| (month - 1 + i) % 12 + 1).collect();
        self.festivals
            .iter()
            .filter(|f| f.months.iter().any(|m| window.contains(m)))
            .collect()
    }

    pub fn major_festivals(&self) -> Vec<&Festival> {
        self.festivals.iter().filter(|f| f.major).collect()
    }

    pub fn helplines_in(&self, category: &str) -> Vec<&Helpline> {
        self.helplines
            .iter()
            .filter(|h| h.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Up to `n` place names for suggestions.
    pub fn highlight_names(&self, n: usize) -> Vec<String> {
        self.places.iter().take(n).map(|p| p.name.clone()).collect()
    }
}

fn parse_builtin<T: DeserializeOwned>(name: &str, source: &str) -> AppResult<T> {
    serde_json::from_str(source)
        .map_err(|e| AppError::Config(format!("Built-in {} records are invalid: {}", name, e)))
}

fn load_or_builtin<T: DeserializeOwned>(path: &Path, name: &str, builtin: &str) -> AppResult<T> {
    if !path.exists() {
        tracing::warn!("{:?} not found; using built-in {} records", path, name);
        return parse_builtin(name, builtin);
    }

    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| AppError::Config(format!("Invalid {} records in {:?}: {}", name, path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn records() -> Records {
        Records::builtin().unwrap()
    }

    #[test]
    fn test_builtin_records_parse() {
        let records = records();
        assert!(!records.hotels.is_empty());
        assert!(!records.helplines.is_empty());
        assert!(!records.festivals.is_empty());
        assert!(!records.places.is_empty());
        assert!(!records.routes.is_empty());
        assert!(records.locations.contains_key("Ranchi"));
    }

    #[test]
    fn test_every_hotel_has_price_and_link() {
        for hotel in &records().hotels {
            assert!(!hotel.price_range.is_empty(), "{} has no price", hotel.name);
            assert!(hotel.link.starts_with("https://"), "{} has no link", hotel.name);
        }
    }

    #[test]
    fn test_hotels_in_is_case_insensitive() {
        let records = records();
        let hotels = records.hotels_in("NETARHAT");
        assert!(!hotels.is_empty());
        assert!(hotels.iter().all(|h| h.location == "Netarhat"));
    }

    #[test]
    fn test_find_route_either_direction() {
        let records = records();
        let forward = records.find_route("ranchi", "deoghar").unwrap();
        assert_eq!(forward.origin, "Ranchi");

        let backward = records.find_route("Deoghar", "Ranchi").unwrap();
        assert_eq!(backward.origin, "Deoghar");
        assert_eq!(backward.destination, "Ranchi");
        assert_eq!(backward.landmarks, vec!["Giridih", "Hazaribagh"]);

        assert!(records.find_route("ranchi", "gumla").is_none());
    }

    #[test]
    fn test_mentioned_places_in_order() {
        let records = records();
        let text = normalize("Is Deoghar far from Ranchi?");
        assert_eq!(records.mentioned_places(&text, &[]), vec!["deoghar", "ranchi"]);

        let extra = vec!["Gumla".to_string()];
        let text = normalize("Gumla to Ranchi");
        assert_eq!(records.mentioned_places(&text, &extra), vec!["gumla", "ranchi"]);
    }

    #[test]
    fn test_upcoming_festivals_wrap_year() {
        let records = records();
        let names: Vec<_> = records
            .upcoming_festivals(11)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        // November, December, January
        assert!(names.contains(&"Tusu"));
        assert!(names.contains(&"Chhath"));
        assert!(!names.contains(&"Sarhul"));
    }

    #[test]
    fn test_festival_named() {
        let records = records();
        let text = normalize("When is Sarhul celebrated?");
        assert_eq!(records.festival_named(&text).unwrap().name, "Sarhul");
        assert!(records.festival_named(&normalize("any fairs?")).is_none());
    }

    #[test]
    fn test_load_prefers_files_and_falls_back() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("hotels.json"),
            r#"[{"name":"Test Lodge","location":"Gumla","tier":"budget","price_range":"₹700","link":"https://example.org"}]"#,
        )
        .unwrap();

        let config = AppConfig {
            data_dir: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let records = Records::load(&config).unwrap();

        assert_eq!(records.hotels.len(), 1);
        assert_eq!(records.hotels[0].name, "Test Lodge");
        // Missing files use built-ins
        assert!(!records.routes.is_empty());
    }

    #[test]
    fn test_invalid_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("routes.json"), "{ not json").unwrap();

        let config = AppConfig {
            data_dir: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let err = Records::load(&config).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }
}
