//! SQLite persistence adapter for Timer State Records.

use crate::core::clock::parse_timestamp;
use crate::core::session::TimerStore;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::timer_key::TimerKey;
use crate::models::timer_state::TimerStateRecord;
use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::{Row, params};

pub struct SqliteTimerStore {
    pool: DbPool,
    /// Offset applied to stored timestamps that lack one (legacy rows).
    fallback_offset: FixedOffset,
}

impl SqliteTimerStore {
    pub fn new(pool: DbPool, fallback_offset: FixedOffset) -> Self {
        Self {
            pool,
            fallback_offset,
        }
    }

}

impl TimerStore for SqliteTimerStore {
    fn load_all(&mut self) -> AppResult<Vec<TimerStateRecord>> {
        let mut stmt = self
            .pool
            .conn
            .prepare("SELECT * FROM active_timers ORDER BY timer_key ASC")?;

        let fallback = self.fallback_offset;
        let rows = stmt.query_map([], |row| map_row_with_offset(row, fallback))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Upsert by timer_key: concurrent writers resolve last-write-wins.
    fn save(&mut self, record: &TimerStateRecord) -> AppResult<()> {
        self.pool.conn.execute(
            "INSERT INTO active_timers
                (timer_key, task, stage, user, start_time, accumulated_seconds, is_paused, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(timer_key) DO UPDATE SET
                start_time = excluded.start_time,
                accumulated_seconds = excluded.accumulated_seconds,
                is_paused = excluded.is_paused,
                updated_at = excluded.updated_at",
            params![
                record.key.encode(),
                record.key.task,
                record.key.stage,
                record.key.user,
                record.start_time.to_rfc3339(),
                record.accumulated_seconds,
                if record.is_paused { 1 } else { 0 },
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn update_state(
        &mut self,
        key: &TimerKey,
        accumulated_seconds: i64,
        is_paused: bool,
        start_time: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let changed = match start_time {
            Some(start) => self.pool.conn.execute(
                "UPDATE active_timers
                 SET accumulated_seconds = ?1, is_paused = ?2, start_time = ?3, updated_at = ?4
                 WHERE timer_key = ?5",
                params![
                    accumulated_seconds,
                    if is_paused { 1 } else { 0 },
                    start.to_rfc3339(),
                    Utc::now().to_rfc3339(),
                    key.encode(),
                ],
            )?,
            None => self.pool.conn.execute(
                "UPDATE active_timers
                 SET accumulated_seconds = ?1, is_paused = ?2, updated_at = ?3
                 WHERE timer_key = ?4",
                params![
                    accumulated_seconds,
                    if is_paused { 1 } else { 0 },
                    Utc::now().to_rfc3339(),
                    key.encode(),
                ],
            )?,
        };

        if changed == 0 {
            return Err(AppError::TimerNotFound(key.to_string()));
        }
        Ok(())
    }

    /// Deleting an absent key succeeds: stop must be idempotent.
    fn delete(&mut self, key: &TimerKey) -> AppResult<()> {
        self.pool
            .conn
            .execute("DELETE FROM active_timers WHERE timer_key = ?1", [key.encode()])?;
        Ok(())
    }
}

fn map_row_with_offset(
    row: &Row,
    fallback: FixedOffset,
) -> rusqlite::Result<TimerStateRecord> {
    let task: String = row.get("task")?;
    let stage: String = row.get("stage")?;
    let user: String = row.get("user")?;
    let start_raw: String = row.get("start_time")?;
    let accumulated: i64 = row.get("accumulated_seconds")?;
    let is_paused: bool = row.get::<_, i64>("is_paused")? == 1;

    let wrap = |e: AppError| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    };

    let key = TimerKey::new(&task, &stage, &user).map_err(wrap)?;
    let start_time = parse_timestamp(&start_raw, fallback).map_err(wrap)?;
    TimerStateRecord::from_parts(key, start_time, accumulated, is_paused).map_err(wrap)
}
