//! SQLite ledger of completed time entries.

use crate::core::session::LedgerWriter;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::time_entry::TimeEntry;
use chrono::NaiveDate;
use rusqlite::{Row, params};

/// One ledger row as read back for listing.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub id: i64,
    pub task: String,
    pub stage: String,
    pub user: String,
    pub entry_date: String,
    pub elapsed_seconds: i64,
    pub session_start: String,
    pub source: String,
}

/// Filters for the `entries` listing. Empty filter lists everything.
#[derive(Debug, Default, Clone)]
pub struct LedgerFilter {
    pub dates: Option<(NaiveDate, NaiveDate)>,
    pub task: Option<String>,
    pub stage: Option<String>,
    pub user: Option<String>,
}

pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn list_entries(&mut self, filter: &LedgerFilter) -> AppResult<Vec<LedgerRow>> {
        let mut sql = String::from(
            "SELECT id, task, stage, user, entry_date, elapsed_seconds, session_start, source
             FROM time_entries WHERE 1=1",
        );
        let mut args: Vec<String> = Vec::new();

        if let Some((from, to)) = &filter.dates {
            args.push(from.format("%Y-%m-%d").to_string());
            sql.push_str(&format!(" AND entry_date >= ?{}", args.len()));
            args.push(to.format("%Y-%m-%d").to_string());
            sql.push_str(&format!(" AND entry_date <= ?{}", args.len()));
        }
        if let Some(task) = &filter.task {
            args.push(task.clone());
            sql.push_str(&format!(" AND task = ?{}", args.len()));
        }
        if let Some(stage) = &filter.stage {
            args.push(stage.clone());
            sql.push_str(&format!(" AND stage = ?{}", args.len()));
        }
        if let Some(user) = &filter.user {
            args.push(user.clone());
            sql.push_str(&format!(" AND user = ?{}", args.len()));
        }

        sql.push_str(" ORDER BY entry_date ASC, id ASC");

        let mut stmt = self.pool.conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> =
            args.iter().map(|s| s as &dyn rusqlite::ToSql).collect();

        let rows = stmt.query_map(rusqlite::params_from_iter(params), map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

impl LedgerWriter for SqliteLedger {
    /// Append a completed entry. Idempotent under the natural key
    /// (task, stage, user, entry_date, elapsed_seconds): a repeated
    /// settlement of the same session lands on the same row.
    fn append_entry(&mut self, entry: &TimeEntry) -> AppResult<()> {
        self.pool.conn.execute(
            "INSERT INTO time_entries
                (task, stage, user, entry_date, elapsed_seconds, session_start, source, meta, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(task, stage, user, entry_date, elapsed_seconds) DO NOTHING",
            params![
                entry.key.task,
                entry.key.stage,
                entry.key.user,
                entry.entry_date(),
                entry.elapsed_seconds,
                entry.session_start.to_rfc3339(),
                entry.source,
                entry.meta,
                entry.created_at,
            ],
        )?;
        Ok(())
    }
}

fn map_row(row: &Row) -> rusqlite::Result<LedgerRow> {
    Ok(LedgerRow {
        id: row.get("id")?,
        task: row.get("task")?,
        stage: row.get("stage")?,
        user: row.get("user")?,
        entry_date: row.get("entry_date")?,
        elapsed_seconds: row.get("elapsed_seconds")?,
        session_start: row.get("session_start")?,
        source: row.get("source")?,
    })
}
