//! Wall-clock access and elapsed-time computation.
//!
//! `elapsed_seconds` is the single source of truth for "how much time has
//! passed": both the live `status` display and the final settlement on stop
//! go through it.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Source of the current instant. Commands use [`SystemClock`]; tests
/// substitute a fixed clock to make durations deterministic.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whole seconds elapsed between `start` and `now`, both in UTC.
///
/// Clock skew (a start instant in the future) clamps to zero; the result is
/// never negative. Pure: safe to call repeatedly for display.
pub fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_seconds().max(0)
}

/// Parse a timestamp from the store or from user input into UTC.
///
/// Offset-aware inputs (RFC 3339) convert directly. Inputs without an
/// offset are interpreted at the configured fixed offset, NOT the local
/// zone at read time, so a timer spanning a daylight-saving switch is not
/// shifted twice.
pub fn parse_timestamp(raw: &str, fallback: FixedOffset) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            let local = naive
                .and_local_timezone(fallback)
                .single()
                .ok_or_else(|| AppError::InvalidTimestamp(raw.to_string()))?;
            return Ok(local.with_timezone(&Utc));
        }
    }

    Err(AppError::InvalidTimestamp(raw.to_string()))
}

/// Parse a `"+HH:MM"` / `"-HH:MM"` offset string from the config file.
pub fn parse_utc_offset(raw: &str) -> AppResult<FixedOffset> {
    let bad = || AppError::Config(format!("invalid UTC offset '{}'", raw));

    let (sign, rest) = match raw.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(bad()),
    };

    let (h, m) = rest.split_once(':').ok_or_else(bad)?;
    let hours: i32 = h.parse().map_err(|_| bad())?;
    let minutes: i32 = m.parse().map_err(|_| bad())?;
    if hours > 23 || minutes > 59 {
        return Err(bad());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(bad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn elapsed_matches_duration() {
        let now = Utc::now();
        for secs in [0i64, 1, 59, 3600, 86_400] {
            let start = now - Duration::seconds(secs);
            assert_eq!(elapsed_seconds(start, now), secs);
        }
    }

    #[test]
    fn future_start_clamps_to_zero() {
        let now = Utc::now();
        let start = now + Duration::seconds(120);
        assert_eq!(elapsed_seconds(start, now), 0);
    }

    #[test]
    fn rfc3339_input_keeps_its_offset() {
        let off = parse_utc_offset("+00:00").unwrap();
        let dt = parse_timestamp("2026-03-29T01:30:00+02:00", off).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-28T23:30:00+00:00");
    }

    #[test]
    fn naive_input_uses_fallback_offset() {
        let off = parse_utc_offset("+02:00").unwrap();
        let dt = parse_timestamp("2026-03-29 01:30:00", off).unwrap();
        // 01:30 at +02:00 is 23:30 UTC the day before
        assert_eq!(dt.to_rfc3339(), "2026-03-28T23:30:00+00:00");
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let off = parse_utc_offset("+00:00").unwrap();
        assert!(parse_timestamp("yesterday-ish", off).is_err());
    }

    #[test]
    fn offset_parsing() {
        assert_eq!(
            parse_utc_offset("-05:30").unwrap(),
            FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap()
        );
        assert!(parse_utc_offset("0200").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }
}
