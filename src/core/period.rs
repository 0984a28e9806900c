//! Period keys
//!
//! A period key is an instant floored to a 15-minute bucket and rendered as
//! `YYYY-MM-DDTHH:MM` (UTC). It is the only time representation that leaves
//! the engines.

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use crate::PERIOD_MINUTES;

const PERIOD_FORMAT: &str = "%Y-%m-%dT%H:%M";

lazy_static! {
    static ref PERIOD_KEY: Regex = Regex::new(
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}$"
    ).unwrap();
}

/// Floor an instant to its period bucket
pub fn floor_to_period(now: DateTime<Utc>) -> NaiveDateTime {
    let naive = now.naive_utc();
    let minute = naive.minute() - naive.minute() % PERIOD_MINUTES;
    naive
        .with_minute(minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(naive)
}

/// Period key for an instant
pub fn period_key(now: DateTime<Utc>) -> String {
    floor_to_period(now).format(PERIOD_FORMAT).to_string()
}

/// Period key `offset` after the bucket containing `now`
pub fn period_key_after(now: DateTime<Utc>, offset: Duration) -> String {
    (floor_to_period(now) + offset).format(PERIOD_FORMAT).to_string()
}

/// Does this look like a period key?
pub fn is_period_key(key: &str) -> bool {
    PERIOD_KEY.is_match(key)
}

/// Parse a period key. `None` for anything malformed.
pub fn parse_period_key(key: &str) -> Option<NaiveDateTime> {
    if !is_period_key(key) {
        return None;
    }
    NaiveDateTime::parse_from_str(key, PERIOD_FORMAT).ok()
}

/// Parse a period key and truncate to its hour
pub fn parse_period_hour(key: &str) -> Option<NaiveDateTime> {
    parse_period_key(key)
        .and_then(|t| t.with_minute(0))
}
