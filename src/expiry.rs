//! Date arithmetic for expiry countdowns and the trash retention window.
//!
//! Day counts are calendar-day differences of the UTC dates, so an item
//! expiring tomorrow at 00:30 is one day away even when it is only an hour off.
//! Nothing here fails: malformed text parses to `None` and out-of-range
//! arithmetic degrades to zero days.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// Days after deletion before a trashed item is due for clearing.
pub const TRASH_RETENTION_DAYS: i64 = 30;

/// Highest day count still classified as danger.
pub const DANGER_MAX_DAYS: i64 = 3;

/// Highest day count still classified as warning. Items further out are
/// password-gated for edits and deletes.
pub const WARNING_MAX_DAYS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Danger,
    Warning,
    Safe,
}

pub fn days_until_expiry(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    calendar_days_between(now, expiry_date)
}

pub fn classify(days_until_expiry: i64) -> ExpiryStatus {
    if days_until_expiry <= DANGER_MAX_DAYS {
        ExpiryStatus::Danger
    } else if days_until_expiry <= WARNING_MAX_DAYS {
        ExpiryStatus::Warning
    } else {
        ExpiryStatus::Safe
    }
}

pub fn is_expired(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expiry_date
}

pub fn days_until_trash_clear(deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    match deleted_at.checked_add_signed(Duration::days(TRASH_RETENTION_DAYS)) {
        Some(clear_at) => calendar_days_between(now, clear_at),
        None => 0,
    }
}

/// [`days_until_expiry`] over stored text. Unparseable input counts as 0 days.
pub fn days_until_expiry_raw(expiry_date: &str, now: DateTime<Utc>) -> i64 {
    parse_instant(expiry_date).map_or(0, |expiry| days_until_expiry(expiry, now))
}

/// [`is_expired`] over stored text. Unparseable input is not expired.
pub fn is_expired_raw(expiry_date: &str, now: DateTime<Utc>) -> bool {
    parse_instant(expiry_date).is_some_and(|expiry| is_expired(expiry, now))
}

pub fn days_until_trash_clear_raw(deleted_at: &str, now: DateTime<Utc>) -> i64 {
    parse_instant(deleted_at).map_or(0, |at| days_until_trash_clear(at, now))
}

/// Parses an RFC 3339 instant, a naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC),
/// or a plain `YYYY-MM-DD` date (UTC midnight).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn calendar_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    to.date_naive()
        .signed_duration_since(from.date_naive())
        .num_days()
}
