//! SQLite connection wrapper (lightweight for CLI usage).
//!
//! One connection per adapter, opened per invocation; no transaction spans
//! a user interaction.

use rusqlite::{Connection, Result};
use std::path::Path;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    /// Open (or create) the database at `path`. Fails with a connectivity
    /// error code when the file cannot be opened, which the caller
    /// classifies as "store unreachable".
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        Ok(Self { conn })
    }
}
