//! Period parsing for ledger listings.

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Inclusive date bounds for a period expression:
/// `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or `A:B` where A and B are any of those.
pub fn parse_period(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    if let Some((a, b)) = p.split_once(':') {
        let (from, _) = period_bounds(a)?;
        let (_, to) = period_bounds(b)?;
        if from > to {
            return Err(AppError::InvalidDate(p.to_string()));
        }
        return Ok((from, to));
    }
    period_bounds(p)
}

fn period_bounds(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    // YYYY-MM-DD
    if let Some(d) = parse_date(p) {
        return Ok((d, d));
    }

    // YYYY-MM
    if let Ok(first) = NaiveDate::parse_from_str(&format!("{}-01", p), "%Y-%m-%d") {
        return Ok((first, last_day_of_month(first.year(), first.month())));
    }

    // YYYY
    if let Ok(year) = p.parse::<i32>()
        && let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        )
    {
        return Ok((first, last));
    }

    Err(AppError::InvalidDate(p.to_string()))
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    // both branches come from a valid (year, month); pred of day 1 exists
    next.and_then(|d| d.pred_opt())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn single_day_period() {
        assert_eq!(
            parse_period("2026-08-30").unwrap(),
            (d("2026-08-30"), d("2026-08-30"))
        );
    }

    #[test]
    fn month_and_year_periods() {
        assert_eq!(
            parse_period("2026-02").unwrap(),
            (d("2026-02-01"), d("2026-02-28"))
        );
        assert_eq!(
            parse_period("2024-02").unwrap(),
            (d("2024-02-01"), d("2024-02-29"))
        );
        assert_eq!(
            parse_period("2026").unwrap(),
            (d("2026-01-01"), d("2026-12-31"))
        );
    }

    #[test]
    fn range_period() {
        assert_eq!(
            parse_period("2025-12:2026-01").unwrap(),
            (d("2025-12-01"), d("2026-01-31"))
        );
    }

    #[test]
    fn invalid_periods_are_rejected() {
        assert!(parse_period("last-week").is_err());
        assert!(parse_period("2026-03:2026-01").is_err());
    }
}
