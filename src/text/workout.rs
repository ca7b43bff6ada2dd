//! Infers a short human description of a workout from noisy activity data.
//!
//! The rules are precedent, not a classifier: every keyword set and the
//! evaluation order live in [`crate::text::workout_tables`].

use std::sync::OnceLock;

use regex::Regex;

use crate::model::ActivitySummary;
use crate::text::workout_tables::{
    BRAND_CLASS_TYPES, BRAND_TRAILING_NAME_SEPARATORS, CLASS_TYPE_KEYWORDS,
    GENERIC_INDOOR_TEMPLATE, GENERIC_TEMPLATE, INDOOR_DISTANCE_THRESHOLD, INDOOR_PHRASINGS,
    KIND_TEMPLATES, KNOWN_PLACES, Measure, NAME_KEYWORDS, NOT_INSTRUCTORS, NOT_PLACES,
    OUTDOOR_RIDE_TEMPLATE, OUTPUT_SUFFIX_BRANDS, SPIN_KEYWORD, STUDIO_BRANDS, StudioBrand,
    TYPE_TAGS, UNITS_PER_MILE, WorkoutKind,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutInput<'a> {
    pub name: &'a str,
    pub activity_type: Option<&'a str>,
    /// Numeric value with a unit suffix, e.g. `"3.1 miles"`.
    pub distance: &'a str,
    /// Display duration, e.g. `"45m"`.
    pub duration: &'a str,
    pub output_kj: Option<f64>,
}

impl<'a> From<&'a ActivitySummary> for WorkoutInput<'a> {
    fn from(activity: &'a ActivitySummary) -> Self {
        Self {
            name: &activity.name,
            activity_type: activity.activity_type.as_deref(),
            distance: &activity.distance,
            duration: &activity.duration,
            output_kj: activity.output_kj,
        }
    }
}

fn distance_re() -> &'static Regex {
    static DISTANCE_RE: OnceLock<Regex> = OnceLock::new();
    DISTANCE_RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*([A-Za-z]*)").expect("valid distance regex")
    })
}

fn in_place_re() -> &'static Regex {
    static IN_PLACE_RE: OnceLock<Regex> = OnceLock::new();
    IN_PLACE_RE.get_or_init(|| {
        Regex::new(r"(?:^|\s)in ([a-z]+)\b").expect("valid location regex")
    })
}

fn with_instructor_re() -> &'static Regex {
    static WITH_RE: OnceLock<Regex> = OnceLock::new();
    WITH_RE.get_or_init(|| {
        Regex::new(r"\bwith\s+([A-Z][A-Za-z\-]*)").expect("valid instructor regex")
    })
}

fn possessive_re() -> &'static Regex {
    static POSSESSIVE_RE: OnceLock<Regex> = OnceLock::new();
    POSSESSIVE_RE.get_or_init(|| {
        Regex::new(r"\b([A-Z][A-Za-z]+)[’']s\b").expect("valid possessive regex")
    })
}

fn duration_words_re() -> &'static Regex {
    static DURATION_WORDS_RE: OnceLock<Regex> = OnceLock::new();
    DURATION_WORDS_RE.get_or_init(|| {
        Regex::new(r"\b\d+\s*(?:min(?:ute)?s?|m)\b").expect("valid duration words regex")
    })
}

#[derive(Debug, Clone, PartialEq)]
struct Distance {
    miles: f64,
    rendered: String,
}

fn units_per_mile(unit: &str) -> f64 {
    let lower = unit.to_lowercase();
    UNITS_PER_MILE
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, per_mile)| *per_mile)
        .unwrap_or_else(|| {
            if !lower.is_empty() {
                tracing::debug!(unit, "unknown distance unit; reading as miles");
            }
            1.0
        })
}

/// Splits `"3.1 miles"` into its length in miles and a display form where
/// `miles` reads as the singular `mile`. Other units are shown as written.
fn parse_distance(raw: &str) -> Option<Distance> {
    let caps = distance_re().captures(raw)?;
    let number = caps.get(1)?.as_str();
    let value: f64 = number.parse().ok()?;
    if value <= 0.0 {
        return None;
    }
    let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let miles = value / units_per_mile(unit);
    let unit = if unit == "miles" { "mile" } else { unit };
    let rendered = if unit.is_empty() {
        number.to_owned()
    } else {
        format!("{number} {unit}")
    };
    Some(Distance { miles, rendered })
}

/// True when `keyword` occurs in `haystack` at the start of a word.
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}

fn location_suffix(lower_name: &str) -> String {
    let from_pattern = in_place_re()
        .captures_iter(lower_name)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|word| !NOT_PLACES.contains(word));
    if let Some(place) = from_pattern {
        return format!(" in {place}");
    }

    lower_name
        .split(|c: char| !c.is_alphanumeric())
        .find(|word| KNOWN_PLACES.contains(word))
        .map(|place| format!(" in {place}"))
        .unwrap_or_default()
}

fn kind_from_tag(tag: &str) -> Option<WorkoutKind> {
    let normalized: String = tag
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    TYPE_TAGS
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, kind)| *kind)
}

fn kind_from_name(lower_name: &str) -> Option<WorkoutKind> {
    NAME_KEYWORDS
        .iter()
        .find(|(keyword, _)| contains_keyword(lower_name, keyword))
        .map(|(_, kind)| *kind)
}

fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_owned();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Describes a workout, e.g. `"3.1 mile run in tahoe"` or
/// `"45m soulcycle class with zapporah"`.
pub fn describe_workout(input: &WorkoutInput<'_>) -> String {
    let lower_name = input.name.trim().to_lowercase();
    let distance = parse_distance(input.distance);
    let duration = input.duration.trim();
    let location = location_suffix(&lower_name);

    let kind = input
        .activity_type
        .and_then(kind_from_tag)
        .or_else(|| kind_from_name(&lower_name));

    let description = match kind {
        Some(WorkoutKind::Ride) => describe_ride(input, &lower_name, distance.as_ref(), &location),
        Some(kind) => {
            let Some(entry) = KIND_TEMPLATES.iter().find(|t| t.kind == kind) else {
                tracing::debug!(?kind, "no template for workout kind");
                return lower_name;
            };
            let distance_text = distance.as_ref().map(|d| d.rendered.as_str()).unwrap_or("");
            let measure = match entry.measure {
                Measure::Distance if !distance_text.is_empty() => distance_text,
                Measure::Distance => duration,
                Measure::Duration if !duration.is_empty() => duration,
                Measure::Duration => distance_text,
            };
            fill(
                entry.template,
                &[("measure", measure), ("location", location.as_str())],
            )
        }
        None => fill(
            GENERIC_TEMPLATE,
            &[
                (
                    "distance",
                    distance.as_ref().map(|d| d.rendered.as_str()).unwrap_or(""),
                ),
                ("activity", lower_name.as_str()),
            ],
        ),
    };

    description.to_lowercase()
}

fn studio_brand(lower_name: &str) -> Option<StudioBrand> {
    STUDIO_BRANDS
        .iter()
        .find(|(keyword, _)| lower_name.contains(keyword))
        .map(|(_, brand)| *brand)
}

fn has_class_type(lower_name: &str) -> bool {
    CLASS_TYPE_KEYWORDS
        .iter()
        .any(|keyword| contains_keyword(lower_name, keyword))
}

fn is_indoor(
    name: &str,
    lower_name: &str,
    brand: Option<StudioBrand>,
    distance: Option<&Distance>,
) -> bool {
    brand.is_some()
        || contains_keyword(lower_name, SPIN_KEYWORD)
        || distance.is_some_and(|d| d.miles > INDOOR_DISTANCE_THRESHOLD)
        || (with_instructor_re().is_match(name) && has_class_type(lower_name))
}

fn describe_ride(
    input: &WorkoutInput<'_>,
    lower_name: &str,
    distance: Option<&Distance>,
    location: &str,
) -> String {
    let brand = studio_brand(lower_name);
    if !is_indoor(input.name, lower_name, brand, distance) {
        let measure = distance
            .map(|d| d.rendered.as_str())
            .unwrap_or(input.duration.trim());
        return fill(
            OUTDOOR_RIDE_TEMPLATE,
            &[("distance", measure), ("location", location)],
        );
    }

    let instructor = instructor_name(input.name, brand);
    let class_type = class_type_label(lower_name, brand, instructor.as_deref());
    let duration = input.duration.trim();

    let phrasing = INDOOR_PHRASINGS.iter().find(|p| p.brand == brand);
    let template = match (phrasing, &instructor, &class_type) {
        (Some(p), Some(_), Some(_)) => p.with_both,
        (Some(p), Some(_), None) => p.instructor_only,
        (Some(p), None, Some(_)) => p.class_only,
        _ => GENERIC_INDOOR_TEMPLATE,
    };

    let mut sentence = fill(
        template,
        &[
            ("duration", duration),
            ("class", class_type.as_deref().unwrap_or("")),
            ("instructor", instructor.as_deref().unwrap_or("")),
            ("location", location),
        ],
    );

    if template != GENERIC_INDOOR_TEMPLATE
        && let (Some(brand), Some(kj)) = (brand, input.output_kj)
        && OUTPUT_SUFFIX_BRANDS.contains(&brand)
        && kj > 0.0
    {
        sentence.push_str(&format!(", {} kj output", kj.round() as i64));
    }

    sentence
}

fn instructor_name(name: &str, brand: Option<StudioBrand>) -> Option<String> {
    if let Some(caps) = with_instructor_re().captures(name) {
        return caps.get(1).map(|m| m.as_str().to_lowercase());
    }

    let possessive = possessive_re()
        .captures_iter(name)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .find(|word| {
            !NOT_INSTRUCTORS.contains(&word.as_str())
                && STUDIO_BRANDS.iter().all(|(keyword, _)| !keyword.contains(word.as_str()))
        });
    if possessive.is_some() {
        return possessive;
    }

    let brand = brand?;
    let (_, separator) = BRAND_TRAILING_NAME_SEPARATORS
        .iter()
        .find(|(b, _)| *b == brand)?;
    let (_, trailing) = name.rsplit_once(separator)?;
    let trailing = trailing.trim();
    let words: Vec<&str> = trailing.split_whitespace().collect();
    let looks_like_name = !words.is_empty()
        && words.len() <= 3
        && words
            .iter()
            .all(|w| w.chars().all(|c| c.is_alphabetic() || c == '-'));
    let lower = trailing.to_lowercase();
    let mentions_brand = STUDIO_BRANDS
        .iter()
        .any(|(keyword, _)| lower.contains(keyword));
    (looks_like_name && !mentions_brand).then_some(lower)
}

fn class_type_label(
    lower_name: &str,
    brand: Option<StudioBrand>,
    instructor: Option<&str>,
) -> Option<String> {
    if let Some(brand) = brand {
        let label = BRAND_CLASS_TYPES
            .iter()
            .filter(|(b, _, _)| *b == brand)
            .find(|(_, keyword, _)| contains_keyword(lower_name, keyword))
            .map(|(_, _, label)| (*label).to_owned());
        if label.is_some() {
            return label;
        }
    }

    let cleaned = cleaned_class_name(lower_name, instructor);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Activity name with brands, instructor, durations, locations and filler
/// words removed.
fn cleaned_class_name(lower_name: &str, instructor: Option<&str>) -> String {
    let mut text = duration_words_re().replace_all(lower_name, " ").into_owned();
    text = in_place_re().replace_all(&text, " ").into_owned();
    if let Some(instructor) = instructor {
        text = text
            .replace(&format!("with {instructor}"), " ")
            .replace(&format!("{instructor}'s"), " ")
            .replace(&format!("{instructor}’s"), " ");
        if let Some((head, tail)) = text.rsplit_once(['-', ':'])
            && tail.trim() == instructor
        {
            text = head.to_owned();
        }
    }
    for (keyword, _) in STUDIO_BRANDS {
        text = text.replace(keyword, " ");
    }

    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|word| word.trim_matches('-'))
        .filter(|word| !word.is_empty())
        .filter(|word| !matches!(*word, "spin" | "class" | "ride" | "cycling" | "indoor"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(name: &str, kind: Option<&str>, distance: &str, duration: &str) -> String {
        describe_workout(&WorkoutInput {
            name,
            activity_type: kind,
            distance,
            duration,
            output_kj: None,
        })
    }

    #[test]
    fn run_uses_singular_mile() {
        let out = describe("Morning Run", Some("run"), "3.1 miles", "28m");
        assert!(out.contains("3.1 mile run"), "{out}");
        assert_eq!(out, "3.1 mile run");
    }

    #[test]
    fn other_units_pass_through() {
        assert_eq!(describe("Loop", Some("Run"), "5 km", "25m"), "5 km run");
    }

    #[test]
    fn soulcycle_with_instructor() {
        let out = describe("SoulCycle with Zapporah", Some("ride"), "", "45m");
        assert!(out.contains("soulcycle class with zapporah"), "{out}");
        assert_eq!(out, "45m soulcycle class with zapporah");
    }

    #[test]
    fn soulcycle_trailing_instructor_and_class_type() {
        let out = describe("SoulCycle Throwback - Mireya", Some("Ride"), "", "45m");
        assert_eq!(out, "45m soulcycle throwback class with mireya");
    }

    #[test]
    fn peloton_possessive_instructor_and_output() {
        let out = describe_workout(&WorkoutInput {
            name: "Peloton Cody's 30 min Pop Ride",
            activity_type: Some("VirtualRide"),
            distance: "9.2 miles",
            duration: "30m",
            output_kj: Some(312.4),
        });
        assert_eq!(out, "30m peloton pop ride with cody, 312 kj output");
    }

    #[test]
    fn outdoor_ride_keeps_distance_and_location() {
        let out = describe("Ride in Marin", Some("Ride"), "24.0 km", "1h 10m");
        assert_eq!(out, "24.0 km bike ride in marin");

        let out = describe("Lunch ride around tahoe", Some("Ride"), "12.4 miles", "50m");
        assert_eq!(out, "12.4 mile bike ride in tahoe");
    }

    #[test]
    fn indoor_threshold_is_measured_in_miles() {
        assert_eq!(
            describe("Lunch ride", Some("Ride"), "20 km", "50m"),
            "20 km bike ride"
        );
        assert_eq!(
            describe("Lunch ride", Some("Ride"), "9000 m", "30m"),
            "9000 m bike ride"
        );
        // 30 km is about 18.6 miles.
        assert_eq!(
            describe("Lunch ride", Some("Ride"), "30 km", "50m"),
            "50m lunch spin class"
        );
        assert_eq!(
            describe("Lunch ride", Some("Ride"), "16 miles", "50m"),
            "50m lunch spin class"
        );
    }

    #[test]
    fn hyphenated_in_is_not_a_location() {
        assert_eq!(
            describe("Check-in ride", Some("Ride"), "10 miles", "40m"),
            "10 mile bike ride"
        );
        assert_eq!(
            describe("In marin ride", Some("Ride"), "10 miles", "40m"),
            "10 mile bike ride in marin"
        );
    }

    #[test]
    fn peloton_trailing_instructor_after_colon() {
        let out = describe("Peloton 30 min Climb: Denis Morton", Some("Ride"), "", "30m");
        assert_eq!(out, "30m peloton climb ride with denis morton");
    }

    #[test]
    fn soulcycle_never_reports_output() {
        let out = describe_workout(&WorkoutInput {
            name: "SoulCycle with Zapporah",
            activity_type: Some("Ride"),
            distance: "",
            duration: "45m",
            output_kj: Some(400.0),
        });
        assert_eq!(out, "45m soulcycle class with zapporah");
    }

    #[test]
    fn instructor_plus_class_type_means_indoor() {
        let out = describe("Climb with Alex", Some("Ride"), "8 miles", "30m");
        assert_eq!(out, "30m climb spin class with alex");
    }

    #[test]
    fn spin_without_details_is_generic_indoor() {
        let out = describe("Spin", Some("Ride"), "", "40m");
        assert_eq!(out, "40m indoor cycling class");
    }

    #[test]
    fn type_tag_beats_name_keywords() {
        assert_eq!(
            describe("Evening walk-run", Some("Walk"), "2 miles", "40m"),
            "2 mile walk"
        );
    }

    #[test]
    fn name_keywords_when_tag_missing() {
        assert_eq!(
            describe("Tonal upper body", None, "", "35m"),
            "35m tonal strength session"
        );
        assert_eq!(
            describe("Leg day lifting", None, "", "1h 0m"),
            "1h 0m weight training session"
        );
        assert_eq!(describe("Yoga in the park", None, "", "60m"), "60m yoga class");
    }

    #[test]
    fn duration_templates() {
        assert_eq!(
            describe("Gym", Some("WeightTraining"), "", "50m"),
            "50m weight training session"
        );
        assert_eq!(describe("Laps", Some("Swim"), "", "30m"), "30m swim");
        assert_eq!(
            describe("Reformer", Some("Pilates"), "", "55m"),
            "55m pilates class"
        );
    }

    #[test]
    fn known_places_without_in() {
        assert_eq!(
            describe("Mammoth hike", Some("Hike"), "6.2 miles", "3h 1m"),
            "6.2 mile hike in mammoth"
        );
    }

    #[test]
    fn unknown_activity_uses_generic_template() {
        assert_eq!(
            describe("Kayaking", Some("Kayaking"), "4 miles", "1h 0m"),
            "4 mile kayaking"
        );
        assert_eq!(describe("Bouldering", None, "", "1h 0m"), "bouldering");
    }

    #[test]
    fn keywords_match_word_starts_only() {
        assert!(!contains_keyword("brunch", "run"));
        assert!(contains_keyword("trail running", "run"));
        assert!(contains_keyword("run", "run"));
    }

    #[test]
    fn distance_parsing() {
        assert_eq!(
            parse_distance("3.1 miles"),
            Some(Distance {
                miles: 3.1,
                rendered: "3.1 mile".to_owned()
            })
        );
        assert_eq!(parse_distance("0 miles"), None);
        assert_eq!(parse_distance(""), None);
        assert_eq!(parse_distance("12"), Some(Distance { miles: 12.0, rendered: "12".to_owned() }));

        let km = parse_distance("16.09344 km").unwrap();
        assert!((km.miles - 10.0).abs() < 1e-9, "{km:?}");
        assert_eq!(km.rendered, "16.09344 km");
        let meters = parse_distance("1609.344 M").unwrap();
        assert!((meters.miles - 1.0).abs() < 1e-9, "{meters:?}");
    }
}
