use crate::errors::AppResult;
use chrono::Utc;
use rusqlite::Connection;
use rusqlite::params;

/// Append an operation row to the internal `log` table.
/// Timestamps are UTC like everything else the crate persists.
/// Callers treat failures as non-blocking: a lost log line never
/// aborts the timer operation that produced it.
pub fn oplog(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    stmt.execute(params![Utc::now().to_rfc3339(), operation, target, message])?;

    Ok(())
}
