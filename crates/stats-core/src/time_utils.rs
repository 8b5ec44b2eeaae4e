use chrono::{DateTime, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::formatting::pluralize;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Timestamp parsing and display-timezone conversion.
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler with the given IANA timezone name as the default.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Handler whose naive timestamps are read as UTC.
    pub fn utc() -> Self {
        Self { default_tz: Tz::UTC }
    }

    /// Parse an export timestamp into a UTC [`DateTime`].
    ///
    /// Accepts RFC 3339 with a `Z` suffix or a fixed offset, and the naive
    /// forms `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS[.f]`, which are
    /// interpreted in the handler's default timezone. Returns `None` for
    /// blank or unrecognised input.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }

        const FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in FMTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                if let chrono::LocalResult::Single(dt) = self.default_tz.from_local_datetime(&naive)
                {
                    return Some(dt.with_timezone(&Utc));
                }
            }
        }

        // Malformed timestamps are routine in scraped exports.
        debug!("TimezoneHandler: could not parse timestamp \"{}\"", s);
        None
    }

    /// Expose the configured default timezone.
    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}

// ── Date labels ───────────────────────────────────────────────────────────────

/// Long calendar date in `tz`, e.g. `"March 5, 2021"`.
pub fn format_long_date(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%B %-d, %Y").to_string()
}

/// Fractional days from `earlier` to `later`; negative if reversed.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 86_400_000.0
}

/// How long ago `oldest` was, relative to `now`.
///
/// * `< 30` days  → `"12 days"`
/// * `< 365` days → `"7 months"` (30-day months, rounded)
/// * otherwise    → `"2 years"` or `"2 years, 3 months"`
///
/// A future `oldest` is treated as zero days ago.
pub fn elapsed_since(oldest: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = days_between(oldest, now).max(0.0);

    if days < 30.0 {
        return pluralize(days.round() as i64, "day");
    }
    if days < 365.0 {
        return pluralize((days / 30.0).round() as i64, "month");
    }

    let fractional_years = days / 365.0;
    let years = fractional_years.floor() as i64;
    let months = ((fractional_years - years as f64) * 12.0).round() as i64;

    if months == 0 {
        pluralize(years, "year")
    } else {
        format!("{}, {}", pluralize(years, "year"), pluralize(months, "month"))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Timelike};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    // ── TimezoneHandler::new ─────────────────────────────────────────────────

    #[test]
    fn test_new_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Invalid/Timezone");
        assert_eq!(handler.default_tz(), Tz::UTC);
    }

    // ── TimezoneHandler::parse_timestamp ─────────────────────────────────────

    #[test]
    fn test_parse_timestamp_z_suffix_with_millis() {
        let handler = TimezoneHandler::utc();
        let dt = handler.parse_timestamp("2024-01-15T10:30:00.123Z").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let handler = TimezoneHandler::utc();
        let dt = handler
            .parse_timestamp("2024-01-15T12:00:00+02:00")
            .unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_timestamp_naive_is_default_tz() {
        let handler = TimezoneHandler::utc();
        let dt = handler.parse_timestamp("2024-01-15 08:15:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 8, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let handler = TimezoneHandler::utc();
        assert!(handler.parse_timestamp("").is_none());
        assert!(handler.parse_timestamp("   ").is_none());
        assert!(handler.parse_timestamp("yesterday").is_none());
        assert!(handler.parse_timestamp("2024-13-45T99:00:00Z").is_none());
    }

    // ── format_long_date ─────────────────────────────────────────────────────

    #[test]
    fn test_format_long_date_utc() {
        let dt = Utc.with_ymd_and_hms(2021, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(format_long_date(dt, Tz::UTC), "March 5, 2021");
    }

    #[test]
    fn test_format_long_date_crosses_midnight_in_zone() {
        let dt = Utc.with_ymd_and_hms(2021, 3, 5, 2, 0, 0).unwrap();
        assert_eq!(
            format_long_date(dt, Tz::America__New_York),
            "March 4, 2021"
        );
    }

    // ── elapsed_since ────────────────────────────────────────────────────────

    #[test]
    fn test_elapsed_since_days() {
        assert_eq!(elapsed_since(now() - Duration::days(10), now()), "10 days");
        assert_eq!(elapsed_since(now() - Duration::days(1), now()), "1 day");
        assert_eq!(elapsed_since(now() - Duration::hours(3), now()), "0 days");
    }

    #[test]
    fn test_elapsed_since_months() {
        assert_eq!(elapsed_since(now() - Duration::days(45), now()), "2 months");
        assert_eq!(elapsed_since(now() - Duration::days(30), now()), "1 month");
        assert_eq!(elapsed_since(now() - Duration::days(200), now()), "7 months");
    }

    #[test]
    fn test_elapsed_since_years() {
        assert_eq!(elapsed_since(now() - Duration::days(730), now()), "2 years");
        assert_eq!(
            elapsed_since(now() - Duration::days(400), now()),
            "1 year, 1 month"
        );
        assert_eq!(
            elapsed_since(now() - Duration::days(1000), now()),
            "2 years, 9 months"
        );
    }

    #[test]
    fn test_elapsed_since_month_rounding_up_to_twelve_is_kept() {
        assert_eq!(
            elapsed_since(now() - Duration::days(1090), now()),
            "2 years, 12 months"
        );
    }

    #[test]
    fn test_elapsed_since_future_is_zero() {
        assert_eq!(elapsed_since(now() + Duration::days(3), now()), "0 days");
    }

    #[test]
    fn test_days_between() {
        let a = now();
        assert!((days_between(a, a + Duration::hours(36)) - 1.5).abs() < 1e-9);
    }

    // ── get_system_timezone ──────────────────────────────────────────────────

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        assert!(!get_system_timezone().is_empty());
    }
}
