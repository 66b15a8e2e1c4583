//! Tolerant parsers for the free-text lines of a record.
//!
//! Every function here is total: malformed input yields an empty string or
//! `None`, never an error. The patterns accept the separator glyphs OCR tends
//! to produce in place of a colon (`!`, `l`, `+`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::model::{Gender, RelationType};

static NOT_LETTER: Lazy<Regex> = Lazy::new(|| pattern(r"[^a-zA-Z\s]"));
static NOT_HOUSE_CHAR: Lazy<Regex> = Lazy::new(|| pattern(r"[^a-zA-Z0-9\s-]"));
static NOT_EPIC_CHAR: Lazy<Regex> = Lazy::new(|| pattern(r"[^A-Z0-9]"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| pattern(r"\s+"));

static RELATIVE_NAME: Lazy<Regex> = Lazy::new(|| pattern(r"(?:name|others)\s*(.*)"));
static HOUSE_NUMBER: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)house\s*number.*?[:\s](.*)"));
static AGE: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)Age?\s*[:!l+]\s*([0-9]+)"));
static GENDER: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)Gen(?:de|d|e)?r\s*[:!l+]\s*(\w+)"));
static LOOSE_MALE: Lazy<Regex> = Lazy::new(|| pattern(r"\bma"));
static LOOSE_FEMALE: Lazy<Regex> = Lazy::new(|| pattern(r"\bfe"));

fn pattern(src: &str) -> Regex {
    Regex::new(src).unwrap_or_else(|e| panic!("invalid field pattern {src}: {e}"))
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Upper-case the first letter of every word and lower-case the rest.
fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Voter name from a line like `Name : Ravi Kumar`. The first word is the
/// label and is dropped.
pub fn extract_name(line: &str) -> String {
    let letters = collapse_whitespace(&NOT_LETTER.replace_all(line, ""));
    match letters.split_once(' ') {
        Some((_label, rest)) => capitalize_words(rest),
        None => String::new(),
    }
}

/// Relative's name and relation code from a line like `Father's Name: Mohan`.
///
/// The name and the relation are found independently: a line reading
/// `Husband Mohan` yields no name but still classifies as [`RelationType::Husband`].
pub fn extract_relative(line: &str) -> (String, RelationType) {
    let cleaned = collapse_whitespace(&NOT_LETTER.replace_all(line, " ").to_lowercase());

    let name = RELATIVE_NAME
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| capitalize_words(m.as_str()))
        .unwrap_or_default();

    (name, classify_relation(&cleaned))
}

fn classify_relation(cleaned: &str) -> RelationType {
    if cleaned.contains("father") {
        RelationType::Father
    } else if cleaned.contains("husband") {
        RelationType::Husband
    } else if cleaned.contains("others") {
        RelationType::Other
    } else {
        RelationType::Unknown
    }
}

/// House number from a line like `House Number : 12-A`.
///
/// An empty value or a lone `-` is kept verbatim since both mark a missing
/// house number in the roll. Case of the value is preserved.
pub fn extract_house_number(line: &str) -> String {
    let cleaned = collapse_whitespace(&NOT_HOUSE_CHAR.replace_all(line, " "));
    let Some(value) = HOUSE_NUMBER.captures(&cleaned).and_then(|caps| caps.get(1)) else {
        return String::new();
    };
    let value = value.as_str();
    if value.is_empty() || value == "-" {
        return value.to_string();
    }
    value.trim_matches(|c| c == ' ' || c == '-').to_string()
}

/// Integer value of a noisy numeric field. Anything after the first `.` is
/// discarded, then every non-digit. No digits left means `None`, not zero.
pub fn clean_number(value: Option<&str>) -> Option<u64> {
    let integral = value?.split('.').next().unwrap_or_default();
    let digits: String = integral.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

pub fn extract_age(line: &str) -> Option<u64> {
    AGE.captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Gender from a line like `Age : 40 Gender : Male`.
///
/// Tries the labelled form first. When that fails, any word in `text`
/// starting with `ma` or `fe` decides, which can misfire on unrelated words.
pub fn extract_gender(text: &str) -> Option<Gender> {
    let strict = GENDER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| classify_gender(&m.as_str().to_lowercase()));
    if strict.is_some() {
        return strict;
    }

    let lowered = text.to_lowercase();
    if LOOSE_MALE.is_match(&lowered) {
        Some(Gender::Male)
    } else if LOOSE_FEMALE.is_match(&lowered) {
        Some(Gender::Female)
    } else {
        None
    }
}

// "female" contains "ma" too, so "fe" is checked first.
fn classify_gender(word: &str) -> Option<Gender> {
    if word.contains("fe") {
        Some(Gender::Female)
    } else if word.contains("ma") {
        Some(Gender::Male)
    } else {
        None
    }
}

/// Identifier code with everything but upper-case letters and digits removed.
pub fn extract_epic_no(text: &str) -> String {
    NOT_EPIC_CHAR.replace_all(text, "").into_owned()
}
