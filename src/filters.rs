use once_cell::sync::Lazy;
use regex::Regex;

/// Continent aggregates listed among the birth places
pub const CONTINENT_PATTERNS: [&str; 5] = [
    "Countries in Asia beyond India",
    "Countries in Europe",
    "Countries in Africa",
    "Countries in the Americas",
    "Countries in Oceania",
];

/// Markers of category and aggregate birth-place rows
pub const AGGREGATE_MARKERS: [&str; 9] = [
    "Total",
    "Born in",
    "place of enumeration",
    "Born within",
    "Born outside",
    "state of enumeration",
    "district of enumeration",
    "States in India beyond",
    "Residence",
];

static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

static CONTINENT_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    CONTINENT_PATTERNS
        .iter()
        .map(|p| case_insensitive(p))
        .collect()
});

static UNCLASSIFIABLE: Lazy<Regex> = Lazy::new(|| case_insensitive("Unclassifiable"));

static AGGREGATE: Lazy<Regex> = Lazy::new(|| {
    let alternation = AGGREGATE_MARKERS
        .iter()
        .map(|m| regex::escape(m))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){}", alternation)).unwrap()
});

fn case_insensitive(literal: &str) -> Regex {
    Regex::new(&format!("(?i){}", regex::escape(literal))).unwrap()
}

/// Trim then upper-case, for exact label comparisons
fn folded(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Birth place left over from a numbered sub-header row
pub fn is_numeric_header(birth_place: &str) -> bool {
    DIGITS_ONLY.is_match(birth_place)
}

/// Area row carrying the national total
pub fn is_national_total(area_name: &str) -> bool {
    folded(area_name) == "INDIA"
}

/// Continent patterns paired with their case-insensitive substring regexes
pub fn continent_filters() -> impl Iterator<Item = (&'static str, &'static Regex)> {
    CONTINENT_PATTERNS.iter().copied().zip(CONTINENT_REGEXES.iter())
}

pub fn is_elsewhere(birth_place: &str) -> bool {
    folded(birth_place) == "ELSEWHERE"
}

pub fn is_unclassifiable(birth_place: &str) -> bool {
    UNCLASSIFIABLE.is_match(birth_place)
}

/// Broad aggregate test; also catches real places containing a marker word
pub fn is_aggregate(birth_place: &str) -> bool {
    AGGREGATE.is_match(birth_place)
}
