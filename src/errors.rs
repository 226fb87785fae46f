//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use rusqlite::ErrorCode;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Store unreachable: {0}")]
    StoreUnavailable(String),

    // ---------------------------
    // Parsing / validation errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid timer key: {0}")]
    InvalidKey(String),

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("No timer running for {0}")]
    TimerNotFound(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Classify an error as a transient connectivity failure (retryable,
    /// and a trigger for emergency recovery) as opposed to a data or
    /// logic error (reported immediately, never retried).
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::StoreUnavailable(_) => true,
            AppError::Io(_) => true,
            AppError::Db(e) => is_connectivity(e),
            _ => false,
        }
    }
}

/// SQLite failure codes that mean "the store is unreachable or busy",
/// not "the data is bad".
pub fn is_connectivity(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
        ),
        _ => false,
    }
}

pub type AppResult<T> = Result<T, AppError>;
