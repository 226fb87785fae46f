//! Duration parsing and formatting for CLI input/output.

use crate::errors::{AppError, AppResult};

/// Format a second count as `HH:MM:SS`.
pub fn format_seconds(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let s = secs.abs();
    format!("{}{:02}:{:02}:{:02}", sign, s / 3600, (s % 3600) / 60, s % 60)
}

/// Parse a manual-entry duration into whole seconds.
///
/// Accepted forms: `130s`, `45m`, `2h`, `1h30m`, and `H:MM`.
/// A bare number is rejected so the unit is always explicit.
pub fn parse_duration(input: &str) -> AppResult<i64> {
    let raw = input.trim();
    let bad = || AppError::InvalidDuration(input.to_string());

    if raw.is_empty() {
        return Err(bad());
    }

    // H:MM form
    if let Some((h, m)) = raw.split_once(':') {
        let hours: i64 = h.parse().map_err(|_| bad())?;
        let minutes: i64 = m.parse().map_err(|_| bad())?;
        if hours < 0 || !(0..60).contains(&minutes) {
            return Err(bad());
        }
        return Ok(hours * 3600 + minutes * 60);
    }

    // unit-suffixed form, possibly compound like "1h30m"
    let mut total: i64 = 0;
    let mut num = String::new();
    let mut saw_unit = false;

    for c in raw.chars() {
        if c.is_ascii_digit() {
            num.push(c);
            continue;
        }
        let value: i64 = num.parse().map_err(|_| bad())?;
        num.clear();
        saw_unit = true;
        match c {
            'h' => total += value * 3600,
            'm' => total += value * 60,
            's' => total += value,
            _ => return Err(bad()),
        }
    }

    if !num.is_empty() || !saw_unit {
        // trailing digits without a unit, or no unit at all
        return Err(bad());
    }

    Ok(total)
}
