use super::timer_key::TimerKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a completed time entry reached the ledger.
pub const SOURCE_TIMER: &str = "timer";
pub const SOURCE_MANUAL: &str = "manual";
pub const SOURCE_RECOVERY: &str = "recovery";

/// A completed time entry: one per finished timer session.
///
/// Ledger rows are append-mostly; the natural key
/// (task, stage, user, entry date, elapsed_seconds) makes repeated writes
/// of the same settlement idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub key: TimerKey,
    pub elapsed_seconds: i64,
    /// When the original session was started (UTC).
    pub session_start: DateTime<Utc>,
    pub source: String,
    pub meta: String,
    pub created_at: String,
}

impl TimeEntry {
    pub fn new(
        key: TimerKey,
        elapsed_seconds: i64,
        session_start: DateTime<Utc>,
        source: &str,
    ) -> Self {
        Self {
            key,
            elapsed_seconds,
            session_start,
            source: source.to_string(),
            meta: String::new(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Date component of the session start, used in the ledger natural key.
    pub fn entry_date(&self) -> String {
        self.session_start.format("%Y-%m-%d").to_string()
    }
}
