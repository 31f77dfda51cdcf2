//! Countdown Presenter
//!
//! Pure formatting of backend timestamps for display. Nothing here touches the
//! clock; callers pass `now` explicitly so the output is deterministic.

use chrono::{DateTime, Utc};

use crate::domain::de::parse_timestamp;

/// Shown when there is no (valid) timestamp
pub const NOT_AVAILABLE: &str = "N/A";
/// Shown when the target is already in the past
pub const DUE_NOW: &str = "Due now";

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Renders the time remaining from `now_ms` until an ISO 8601 target.
///
/// - `None` or an unparsable target yields `"N/A"`
/// - a target strictly before `now_ms` yields `"Due now"`
/// - otherwise `"1d 2h 3m 4s"`, with zero units omitted and seconds always
///   shown when no larger unit is
pub fn countdown(now_ms: i64, target: Option<&str>) -> String {
    match target.and_then(parse_timestamp) {
        Some(target) => format_remaining(target.timestamp_millis() - now_ms),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// [`countdown`] for an already-parsed target
pub fn countdown_until(now: DateTime<Utc>, target: Option<DateTime<Utc>>) -> String {
    match target {
        Some(target) => format_remaining(target.timestamp_millis() - now.timestamp_millis()),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn format_remaining(delta_ms: i64) -> String {
    if delta_ms < 0 {
        return DUE_NOW.to_string();
    }

    let days = delta_ms / MS_PER_DAY;
    let hours = (delta_ms % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (delta_ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (delta_ms % MS_PER_MINUTE) / MS_PER_SECOND;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }

    parts.join(" ")
}

/// Renders an absolute timestamp as `YYYY-MM-DD HH:MM:SS` (UTC), or `"N/A"`
pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
