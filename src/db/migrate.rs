//! Schema creation and upgrades. All tables are owned here; nothing else
//! in the crate issues CREATE TABLE.

use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Active timers, one row per (task, stage, user). `timer_key` is the
/// delimited wire form kept for collaborators that still consume it;
/// the structured columns are authoritative.
fn create_active_timers_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS active_timers (
            timer_key           TEXT PRIMARY KEY,
            task                TEXT NOT NULL,
            stage               TEXT NOT NULL,
            user                TEXT NOT NULL,
            start_time          TEXT NOT NULL,
            accumulated_seconds INTEGER NOT NULL DEFAULT 0 CHECK(accumulated_seconds >= 0),
            is_paused           INTEGER NOT NULL DEFAULT 0 CHECK(is_paused IN (0,1)),
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_active_timers_user ON active_timers(user);
        "#,
    )?;
    Ok(())
}

/// Completed time entries. The UNIQUE constraint is the ledger's natural
/// key: a repeated settlement of the same session upserts into the same row.
fn create_time_entries_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS time_entries (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            task            TEXT NOT NULL,
            stage           TEXT NOT NULL,
            user            TEXT NOT NULL,
            entry_date      TEXT NOT NULL,
            elapsed_seconds INTEGER NOT NULL CHECK(elapsed_seconds >= 0),
            session_start   TEXT NOT NULL,
            source          TEXT NOT NULL DEFAULT 'timer' CHECK(source IN ('timer','manual','recovery')),
            meta            TEXT DEFAULT '',
            created_at      TEXT NOT NULL,
            UNIQUE(task, stage, user, entry_date, elapsed_seconds)
        );

        CREATE INDEX IF NOT EXISTS idx_time_entries_date ON time_entries(entry_date);
        CREATE INDEX IF NOT EXISTS idx_time_entries_task ON time_entries(task, stage);
        "#,
    )?;
    Ok(())
}

/// Check if a table has a given column.
fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([table], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Migrate a pre-0.3 `time_entries` table that lacks the `source` column.
fn migrate_add_source_to_entries(conn: &Connection) -> Result<()> {
    if !table_exists(conn, "time_entries")? {
        return Ok(());
    }
    if table_has_column(conn, "time_entries", "source")? {
        return Ok(());
    }

    warning("Adding 'source' column to time_entries table...");

    conn.execute_batch(
        r#"
        ALTER TABLE time_entries ADD COLUMN source TEXT NOT NULL DEFAULT 'timer';
        "#,
    )?;

    success("'source' column added.");
    Ok(())
}

/// Run every pending migration, oldest first. Safe to call on every start.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;
    migrate_add_source_to_entries(conn)?;
    create_active_timers_table(conn)?;
    create_time_entries_table(conn)?;
    Ok(())
}
