//! Lenient timestamp parsing at the spreadsheet boundary.
//!
//! Internally everything is unix epoch seconds (`i64`). User-entered date
//! cells arrive in whatever shape Excel left them in; a malformed date
//! parses to `None` and is never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a user-entered date/time cell. Accepts RFC 3339, the common
/// `YYYY-MM-DD[ HH:MM[:SS]]` forms, US-style `MM/DD/YYYY`, and bare
/// epoch-seconds digit strings. Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // Bare epoch seconds, e.g. "1700000000"
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<i64>().ok();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc().timestamp());
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(nd) = NaiveDate::parse_from_str(s, fmt) {
            return nd.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc().timestamp());
        }
    }

    None
}

/// Current time as epoch seconds.
pub fn now_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
