//! Best-effort salvage of time entries when the store is unreachable.
//!
//! Entries that could not be written to the ledger wait in an in-memory
//! buffer; the CLI spills the buffer to a JSON sidecar file so the next
//! invocation can run a retry pass. If the process dies before the spill,
//! the entries are lost — accepted limitation of the recovery path.

use crate::core::retry::RetryPolicy;
use crate::core::session::LedgerWriter;
use crate::errors::AppResult;
use crate::models::time_entry::TimeEntry;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct RecoveryBuffer {
    pending: Vec<TimeEntry>,
}

impl RecoveryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TimeEntry) {
        self.pending.push(entry);
    }

    pub fn extend(&mut self, entries: Vec<TimeEntry>) {
        self.pending.extend(entries);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.pending
    }

    /// Try to write every buffered entry to the ledger. Entries that fail
    /// again stay buffered. Returns how many were flushed.
    pub fn flush(&mut self, ledger: &mut dyn LedgerWriter, retry: &RetryPolicy) -> usize {
        let mut kept = Vec::new();
        let mut flushed = 0;

        for entry in self.pending.drain(..) {
            match retry.run("ledger append (recovery)", || ledger.append_entry(&entry)) {
                Ok(()) => flushed += 1,
                Err(_) => kept.push(entry),
            }
        }

        self.pending = kept;
        flushed
    }
}

/// Load spilled entries from the sidecar file. A missing file is an empty
/// buffer, not an error.
pub fn load_pending(path: &Path) -> AppResult<Vec<TimeEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    let entries = serde_json::from_str(&raw)
        .map_err(|e| crate::errors::AppError::Other(format!("corrupt recovery file: {}", e)))?;
    Ok(entries)
}

/// Set aside a sidecar file that cannot be read, renaming it with a
/// `.corrupt` suffix so a routine empty-buffer save cannot delete the
/// entries it still holds. Returns the preserved path, if any.
pub fn quarantine_pending(path: &Path) -> AppResult<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut kept = path.as_os_str().to_owned();
    kept.push(".corrupt");
    let kept = PathBuf::from(kept);

    fs::rename(path, &kept)?;
    Ok(Some(kept))
}

/// Persist the buffer to the sidecar file; an empty buffer removes it.
pub fn save_pending(path: &Path, entries: &[TimeEntry]) -> AppResult<()> {
    if entries.is_empty() {
        if path.exists() {
            fs::remove_file(path)?;
        }
        return Ok(());
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(entries)
        .map_err(|e| crate::errors::AppError::Other(format!("serialize recovery file: {}", e)))?;
    fs::write(path, raw)?;
    Ok(())
}
