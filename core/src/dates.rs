//! Bucketing and date-range utilities.
//!
//! Day keys are `YYYY-MM-DD` strings at every boundary. All truncation is
//! pure calendar-date arithmetic on `NaiveDate`, so bucket keys never drift
//! with the host timezone. Malformed keys parse to `None` and are excluded
//! by callers — never raised.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Time-bucket granularity. Day bucketing is identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DAY_KEY_FORMAT).ok()
}

pub fn format_day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Truncate a date to the start of its bucket.
///
/// Day: identity. Week: the Monday of that date's ISO week. Month: the
/// first of the month. Idempotent — truncating an already truncated date
/// returns it unchanged.
pub fn bucket_date(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Parse, truncate, format. `None` when the key does not parse.
pub fn bucket_key(key: &str, granularity: Granularity) -> Option<String> {
    parse_day_key(key).map(|date| format_day_key(bucket_date(date, granularity)))
}

/// A from/to pair of day keys, both optional as they arrive from the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    pub fn single(day: &str) -> Self {
        Self {
            from: Some(day.to_string()),
            to: None,
        }
    }
}

/// A `from` with no `to` means exactly that single day. Fully specified
/// ranges pass through untouched — never silently widened or narrowed.
pub fn normalize_range(range: &DateRange) -> DateRange {
    match (&range.from, &range.to) {
        (Some(from), None) => DateRange {
            from: Some(from.clone()),
            to: Some(from.clone()),
        },
        _ => range.clone(),
    }
}

/// Every day key from `from` to `to` inclusive. Empty when either end fails
/// to parse or the range is inverted — callers treat that as "no data".
pub fn contiguous_day_keys(from: &str, to: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (parse_day_key(from), parse_day_key(to)) else {
        return Vec::new();
    };
    let mut keys = Vec::new();
    let mut day = start;
    while day <= end {
        keys.push(format_day_key(day));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    keys
}

/// Distinct bucket keys covering `from..=to`, in order.
pub fn contiguous_bucket_keys(from: &str, to: &str, granularity: Granularity) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for day in contiguous_day_keys(from, to) {
        if let Some(key) = bucket_key(&day, granularity) {
            if keys.last() != Some(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

/// Inclusive day count of a well-formed range; 0 otherwise.
pub fn inclusive_day_count(from: &str, to: &str) -> i64 {
    match (parse_day_key(from), parse_day_key(to)) {
        (Some(start), Some(end)) if start <= end => (end - start).num_days() + 1,
        _ => 0,
    }
}

/// Snap a from/to pair outward to the full containing week or month, so a
/// granularity switch never produces partial-period boundaries.
pub fn snap_range(
    from: NaiveDate,
    to: NaiveDate,
    granularity: Granularity,
) -> (NaiveDate, NaiveDate) {
    match granularity {
        Granularity::Day => (from, to),
        Granularity::Week => (
            bucket_date(from, Granularity::Week),
            bucket_date(to, Granularity::Week) + Duration::days(6),
        ),
        Granularity::Month => (bucket_date(from, Granularity::Month), end_of_month(to)),
    }
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    match first_of_next {
        Some(next) => next - Duration::days(1),
        None => date,
    }
}
