//! Shared plumbing for command handlers: session construction, adapter
//! opening, key resolution and recovery-buffer spill handling.

use crate::config::Config;
use crate::core::clock::{SystemClock, parse_utc_offset};
use crate::core::recovery::{load_pending, quarantine_pending, save_pending};
use crate::core::retry::RetryPolicy;
use crate::core::session::{LedgerWriter, TimerSession};
use crate::db::ledger::SqliteLedger;
use crate::db::pool::DbPool;
use crate::db::timers::SqliteTimerStore;
use crate::errors::{AppError, AppResult};
use crate::models::timer_key::TimerKey;
use crate::ui::messages;
use std::path::PathBuf;

pub fn retry_policy(cfg: &Config) -> RetryPolicy {
    RetryPolicy::new(cfg.retry_attempts, cfg.retry_backoff_ms)
}

/// Sidecar file for buffered entries. Derived from the active database path
/// unless overridden, so entries buffered against one database are never
/// replayed into another when `--db` points elsewhere.
fn recovery_path(cfg: &Config) -> PathBuf {
    if cfg.recovery_file.is_empty() {
        PathBuf::from(format!("{}.pending.json", cfg.database))
    } else {
        PathBuf::from(&cfg.recovery_file)
    }
}

/// Build a session around the system clock, preloading any entries spilled
/// by a previous invocation into the recovery buffer.
pub fn new_session(cfg: &Config) -> AppResult<TimerSession<SystemClock>> {
    let mut session = TimerSession::new(SystemClock, retry_policy(cfg));

    match load_pending(&recovery_path(cfg)) {
        Ok(pending) if !pending.is_empty() => {
            session.diag.notice(format!(
                "{} buffered entr(y/ies) from a previous run pending",
                pending.len()
            ));
            session.recovery.extend(pending);
        }
        Ok(_) => {}
        Err(e) => {
            session.diag.report(format!("cannot read recovery file: {}", e));
            // Set the unreadable file aside so the end-of-command spill
            // (empty buffer deletes the sidecar) cannot destroy it.
            match quarantine_pending(&recovery_path(cfg)) {
                Ok(Some(kept)) => session.diag.notice(format!(
                    "unreadable recovery file kept at {}",
                    kept.display()
                )),
                Ok(None) => {}
                Err(e) => session.diag.report(format!("cannot set aside recovery file: {}", e)),
            }
        }
    }

    Ok(session)
}

/// Spill whatever is still buffered back to the sidecar file, so the next
/// invocation can retry it. Called at the end of every timer command.
pub fn finish_session(cfg: &Config, session: &TimerSession<SystemClock>) {
    if let Err(e) = save_pending(&recovery_path(cfg), session.recovery.entries()) {
        // worst case per the recovery contract: these entries are lost
        messages::error(format!(
            "cannot write recovery file, {} buffered entr(y/ies) will be lost: {}",
            session.recovery.len(),
            e
        ));
    }
}

pub fn open_store(cfg: &Config) -> AppResult<SqliteTimerStore> {
    let pool = DbPool::new(&cfg.database)?;
    let offset = parse_utc_offset(&cfg.fallback_utc_offset)?;
    Ok(SqliteTimerStore::new(pool, offset))
}

pub fn open_ledger(cfg: &Config) -> AppResult<SqliteLedger> {
    let pool = DbPool::new(&cfg.database)?;
    Ok(SqliteLedger::new(pool))
}

/// Open both adapters and rehydrate the session from the store, running an
/// opportunistic retry pass over previously buffered entries first.
/// Connectivity failures are reported, spill the buffer, and surface.
pub fn open_adapters(
    cfg: &Config,
    session: &mut TimerSession<SystemClock>,
) -> AppResult<(SqliteTimerStore, SqliteLedger)> {
    let mut ledger = match open_ledger(cfg) {
        Ok(l) => l,
        Err(e) => {
            if e.is_transient() {
                session.diag.report(format!("store unreachable: {}", e));
                finish_session(cfg, session);
            }
            return Err(e);
        }
    };

    if !session.recovery.is_empty() {
        let flushed = session.retry_pending(&mut ledger);
        if flushed > 0 {
            messages::success(format!("Recovered {} buffered time entr(y/ies)", flushed));
        }
    }

    let store = open_store(cfg).and_then(|mut s| {
        session.rehydrate(&mut s)?;
        Ok(s)
    });

    match store {
        Ok(s) => Ok((s, ledger)),
        Err(e) => {
            if e.is_transient() {
                session.diag.report(format!("store unreachable: {}", e));
                salvage_running_timers(session, &mut ledger);
                finish_session(cfg, session);
            }
            Err(e)
        }
    }
}

/// Best-effort operation log row; a failed write only warns.
pub fn oplog_quiet(cfg: &Config, operation: &str, target: &str, message: &str) {
    let logged = DbPool::new(&cfg.database)
        .map_err(AppError::from)
        .and_then(|pool| crate::db::log::oplog(&pool.conn, operation, target, message));
    if let Err(e) = logged {
        messages::warning(format!("Failed to write internal log: {}", e));
    }
}

/// Resolve the timer identity from CLI arguments: either the structured
/// task/stage/user parts or the delimited `--key` form.
pub fn resolve_key(
    task: &Option<String>,
    stage: &Option<String>,
    user: &Option<String>,
    key: &Option<String>,
    cfg: &Config,
) -> AppResult<TimerKey> {
    if let Some(encoded) = key {
        return TimerKey::decode(encoded);
    }

    let task = task
        .as_deref()
        .ok_or_else(|| AppError::InvalidKey("missing task name (or use --key)".to_string()))?;
    let stage = stage
        .as_deref()
        .ok_or_else(|| AppError::InvalidKey("missing --stage (or use --key)".to_string()))?;
    let user = user.as_deref().unwrap_or(&cfg.default_user);

    TimerKey::new(task, stage, user)
}

/// Emergency recovery after a connectivity failure mid-operation: salvage
/// every locally-known running timer straight to the ledger, buffering
/// what cannot be written.
pub fn salvage_running_timers(
    session: &mut TimerSession<SystemClock>,
    ledger: &mut dyn LedgerWriter,
) {
    let (written, buffered) = session.emergency_flush(ledger);
    if written > 0 {
        messages::warning(format!(
            "store unreachable: wrote {} running timer(s) straight to the ledger",
            written
        ));
    }
    if buffered > 0 {
        messages::warning(format!(
            "{} entr(y/ies) buffered for a later `booktimer recover`",
            buffered
        ));
    }
}
