use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// US-style local time, e.g. `3/9/2026, 2:05:07 PM`. Daylight saving follows `zone`.
pub fn format(at: DateTime<Utc>, zone: Tz) -> String {
    at.with_timezone(&zone)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

pub fn now(zone: Tz) -> String {
    format(Utc::now(), zone)
}
