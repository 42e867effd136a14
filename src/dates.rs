use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

type YearParser = fn(&str) -> Option<i32>;

// Priority order: ISO-like, slash-delimited, month name with AM/PM. Each
// parser sniffs the string first, so the outcomes match unconditional trial.
const PARSERS: &[YearParser] = &[iso_year, slash_year, twelve_hour_year];

/// Resolves a raw date string to a calendar year, or `None` when no known
/// format matches.
pub fn extract_year(raw: &str) -> Option<i32> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    PARSERS.iter().find_map(|parse| parse(value))
}

fn iso_year(value: &str) -> Option<i32> {
    if value.contains('/') {
        return None;
    }
    // A trailing Z or a numeric offset resolves through the RFC 3339 parse.
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.year());
    }
    // Fractional seconds carry no year information; drop them, and any bare
    // Z left behind, before the naive parse.
    let head = value.split('.').next().unwrap_or(value);
    let head = head.strip_suffix('Z').unwrap_or(head);
    NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
        .map(|parsed| parsed.year())
        .ok()
}

fn slash_year(value: &str) -> Option<i32> {
    if !value.contains('/') {
        return None;
    }
    NaiveDate::parse_from_str(value, "%m/%d/%Y")
        .map(|parsed| parsed.year())
        .ok()
}

fn twelve_hour_year(value: &str) -> Option<i32> {
    if !value.contains("AM") && !value.contains("PM") {
        return None;
    }
    NaiveDateTime::parse_from_str(value, "%Y %b %d %I:%M:%S %p")
        .map(|parsed| parsed.year())
        .ok()
}
