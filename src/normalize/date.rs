//! Date normalization to the table's fixed `DD/MM/YYYY` rendering.
//!
//! The feeds mix ISO dates, ISO timestamps (sometimes with fractional
//! seconds), Brazilian day-first dates, and the occasional two-digit
//! year. Everything parseable comes out as `DD/MM/YYYY`; everything
//! else comes out empty.

use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp shapes, tried before date-only shapes.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Date-only shapes. The two-digit-year form sits before `%d/%m/%Y` so
/// that `02/05/24` is read as 2024 instead of year 24.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"];

const OUTPUT_FORMAT: &str = "%d/%m/%Y";

/// Parse any accepted input shape into a date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let mut text = raw.trim();
    if text.is_empty() {
        return None;
    }
    // Timestamps can carry fractional seconds ("2024-05-02 00:00:00.000");
    // everything from the dot on is noise for a date.
    if let Some(idx) = text.find('.') {
        text = text[..idx].trim_end();
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    None
}

/// Normalize a date string to `DD/MM/YYYY`, or empty if unparseable.
pub fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(OUTPUT_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Term between issuance and maturity in years (365-day basis), rendered
/// with two decimals. Empty when either endpoint is missing or unparseable.
pub fn term_years(issuance: &str, maturity: &str) -> String {
    let (Some(start), Some(end)) = (parse_date(issuance), parse_date(maturity)) else {
        return String::new();
    };
    let days = (end - start).num_days() as f64;
    format!("{:.2}", days / 365.0)
}
