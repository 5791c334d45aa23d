//! Field normalization: raw trimmed text in, typed values out.
//!
//! Required fields (timestamps, passenger count) return `Option` so the caller
//! can drop the row; optional fields fall back to zero.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::str::FromStr;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Parses a timestamp and returns it as a UTC instant.
///
/// Text with an explicit offset (`2024-01-01T13:00:00Z`) is an absolute instant.
/// Anything else is wall-clock time in `zone`, resolved with that zone's rules
/// for the date in question. A wall-clock time that occurs twice (DST
/// fall-back) resolves to standard time; one that never occurs yields `None`,
/// so a row in the spring-forward gap is dropped instead of aborting the run.
pub fn parse_timestamp(text: Option<&str>, zone: Tz) -> Option<DateTime<Utc>> {
    let text = non_blank(text)?;

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }

    let naive = parse_naive(text)?;
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(_daylight, standard) => Some(standard.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Passenger count must fit in one byte.
pub fn parse_passenger_count(text: Option<&str>) -> Option<u8> {
    non_blank(text)?.parse::<u8>().ok()
}

/// Culture-invariant decimal; unparsable or missing becomes zero.
///
/// Tolerates a leading currency symbol, thousands separators, accounting-style
/// parentheses for negatives and scientific notation.
pub fn parse_decimal_or_zero(text: Option<&str>) -> Decimal {
    non_blank(text).and_then(parse_decimal).unwrap_or(Decimal::ZERO)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let (negative, body) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, text),
    };

    let (sign, body) = match body.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", body.strip_prefix('+').unwrap_or(body)),
    };
    let body = body.strip_prefix('$').unwrap_or(body).replace(',', "");
    if body.is_empty() || (negative && !sign.is_empty()) {
        return None;
    }

    let cleaned = format!("{}{}", sign, body);
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;

    Some(if negative { -value } else { value })
}

/// Location identifier; unparsable or missing becomes zero.
pub fn parse_location_id(text: Option<&str>) -> i32 {
    non_blank(text)
        .and_then(|t| t.parse::<i32>().ok())
        .unwrap_or(0)
}

/// `Y`/`N` (any case) become `Yes`/`No`, blank becomes `No`, anything else is kept.
pub fn normalize_store_and_fwd(text: Option<&str>) -> String {
    match non_blank(text) {
        None => "No".to_string(),
        Some(flag) if flag.eq_ignore_ascii_case("Y") => "Yes".to_string(),
        Some(flag) if flag.eq_ignore_ascii_case("N") => "No".to_string(),
        Some(flag) => flag.to_string(),
    }
}
