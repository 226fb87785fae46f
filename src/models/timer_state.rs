use super::timer_key::TimerKey;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One in-progress task timer, persisted so it survives process restarts.
///
/// Exactly one of two modes applies at any instant, selected by `is_paused`:
/// either the timer is accruing time from `start_time`, or it is frozen at
/// `accumulated_seconds` and `start_time` is meaningless.
#[derive(Debug, Clone, Serialize)]
pub struct TimerStateRecord {
    pub key: TimerKey,
    /// When the current running interval began (UTC). Stale while paused.
    pub start_time: DateTime<Utc>,
    /// Sum of all previously closed running intervals.
    pub accumulated_seconds: i64,
    pub is_paused: bool,
}

impl TimerStateRecord {
    /// A freshly started timer: running, nothing accumulated.
    pub fn started(key: TimerKey, start_time: DateTime<Utc>) -> Self {
        Self {
            key,
            start_time,
            accumulated_seconds: 0,
            is_paused: false,
        }
    }

    /// Validating constructor for records read back from the store.
    pub fn from_parts(
        key: TimerKey,
        start_time: DateTime<Utc>,
        accumulated_seconds: i64,
        is_paused: bool,
    ) -> AppResult<Self> {
        if accumulated_seconds < 0 {
            return Err(AppError::InvalidDuration(format!(
                "negative accumulated_seconds ({}) for {}",
                accumulated_seconds, key
            )));
        }
        Ok(Self {
            key,
            start_time,
            accumulated_seconds,
            is_paused,
        })
    }
}
