//! Timestamp normalization and domain age estimation.
//!
//! Upstream providers hand back creation and expiry dates in whatever format
//! the registry happened to use. Everything here is permissive: a value is
//! either parsed into a UTC `NaiveDateTime` or reported as unknown.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static TRAILING_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([+-])(\d{2})(\d{2})$").expect("valid offset regex"));

/// Offset-carrying formats accepted by the strict ISO stage.
const ISO_OFFSET_FORMATS: [&str; 2] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z", // 2020-01-05T10:30:00.5+05:00
    "%Y-%m-%dT%H:%M%:z",       // 2020-01-05T10:30+05:00
];

const ISO_NAIVE_FORMATS: [&str; 2] = [
    "%Y-%m-%dT%H:%M:%S%.f", // 2020-01-05T10:30:00
    "%Y-%m-%dT%H:%M",       // 2020-01-05T10:30
];

const FALLBACK_OFFSET_FORMATS: [&str; 2] = [
    "%Y-%m-%dT%H:%M:%S%z", // 2020-01-05T10:30:00+0500
    "%Y-%m-%d %H:%M:%S%z", // 2020-01-05 10:30:00+0500
];

const FALLBACK_NAIVE_FORMATS: [&str; 2] = [
    "%Y-%m-%dT%H:%M:%S", // 2020-01-05T10:30:00
    "%Y-%m-%d %H:%M:%S", // 2020-01-05 10:30:00
];

const FALLBACK_DATE_FORMATS: [&str; 2] = [
    "%Y-%m-%d", // 2020-01-05
    "%d-%b-%Y", // 05-Jan-2020
];

/// Parse a WHOIS timestamp into a naive instant interpreted as UTC.
///
/// Returns `None` when no known format matches.
pub fn normalize_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let prepared = prepare(trimmed);

    parse_iso(&prepared).or_else(|| parse_fallback(trimmed)).or_else(|| {
        debug!("Failed to parse date: {}", raw);
        None
    })
}

/// Rewrite common non-ISO spellings into something the ISO stage accepts.
fn prepare(s: &str) -> String {
    let mut s = s.trim().to_string();

    if s.ends_with('Z') {
        s.pop();
        s.push_str("+00:00");
    }
    s = s.replace(" UTC", "+00:00");

    if !s.contains('T') {
        let space = s.char_indices().take(20).find(|(_, c)| *c == ' ').map(|(i, _)| i);
        if let Some(i) = space {
            s.replace_range(i..i + 1, "T");
        }
    }

    let tail_start = s.char_indices().rev().nth(5).map(|(i, _)| i).unwrap_or(0);
    if !s[tail_start..].contains(':') {
        let rewrite = TRAILING_OFFSET.captures(&s).and_then(|caps| {
            let whole = caps.get(0)?;
            Some((whole.start(), format!("{}{}:{}", &caps[1], &caps[2], &caps[3])))
        });
        if let Some((start, offset)) = rewrite {
            s.truncate(start);
            s.push_str(&offset);
        }
    }

    s
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for format in &ISO_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }
    }
    for format in &ISO_NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_fallback(s: &str) -> Option<NaiveDateTime> {
    for format in &FALLBACK_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }
    }

    // No explicit offset, assume UTC
    for format in &FALLBACK_NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    for format in &FALLBACK_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Some(dt);
            }
        }
    }

    None
}

/// Estimate the age of a domain from its raw registration date.
pub fn estimate_age(registration: Option<&str>) -> String {
    estimate_age_at(registration, Utc::now().naive_utc())
}

/// Same as [`estimate_age`], evaluated against a fixed `now`.
///
/// Years are whole 365-day blocks; leap days are not accounted for.
pub fn estimate_age_at(registration: Option<&str>, now: NaiveDateTime) -> String {
    let Some(created) = registration.and_then(normalize_timestamp) else {
        return "Unknown".to_string();
    };

    let years = floor_days(now - created).div_euclid(365);
    format!("{} years", years)
}

fn floor_days(delta: Duration) -> i64 {
    let days = delta.num_days();
    if delta < Duration::days(days) {
        days - 1
    } else {
        days
    }
}
