//! Timestamp helpers shared by ledgers and profiles.
//!
//! Timestamps are persisted as RFC-3339 UTC strings with millisecond
//! precision. Lexicographic order of these strings equals chronological
//! order, which the ledger cursor comparison relies on.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Current instant as a persisted timestamp string.
pub fn now_iso() -> String {
    to_iso(Utc::now())
}

/// Format an instant as a persisted timestamp string.
pub fn to_iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a date-like string permissively.
///
/// Accepts full RFC-3339 timestamps and bare `YYYY-MM-DD` dates (read as
/// UTC midnight). Returns `None` for anything else; callers treat that as
/// "filter not supplied" rather than an error.
pub fn parse_date_like(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}
