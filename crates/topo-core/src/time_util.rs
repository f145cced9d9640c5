//! Wall-clock helpers.
//!
//! Timestamps are milliseconds since the Unix epoch. ISO-8601 rendering goes
//! through `chrono` so exports match what browsers produce from
//! `Date.toISOString()`.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as **milliseconds** since Unix epoch.
#[inline]
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Render a millisecond timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Timestamps beyond chrono's representable range render as the epoch.
pub fn iso8601_ms(ts_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Date part (`YYYY-MM-DD`) of a millisecond timestamp, used in export file names.
pub fn iso_date(ts_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms as i64)
        .unwrap_or_default()
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_format_matches_browser_shape() {
        assert_eq!(iso8601_ms(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601_ms(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
        assert_eq!(iso_date(1_700_000_000_123), "2023-11-14");
    }

    #[test]
    fn now_is_after_2020() {
        assert!(now_ms() > 1_577_836_800_000);
    }
}
