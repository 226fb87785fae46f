//! Bounded retry for store and ledger writes.
//!
//! Transient connectivity failures get a fixed number of attempts with a
//! short fixed backoff, then the last error surfaces. Data and logic errors
//! are never retried.

use crate::errors::{AppError, AppResult};
use std::thread;
use std::time::Duration;

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_MS: u64 = 200;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff_ms: u64) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff: Duration::from_millis(backoff_ms),
        }
    }

    /// Run `op`, retrying transient failures up to the attempt budget.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> AppResult<T>,
    {
        let mut last: Option<AppError> = None;

        for attempt in 1..=self.attempts {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() => {
                    if attempt < self.attempts && !self.backoff.is_zero() {
                        thread::sleep(self.backoff);
                    }
                    last = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last.unwrap_or_else(|| {
            AppError::Other(format!("{}: retry budget exhausted", label))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        // no sleeping in tests
        RetryPolicy::new(3, 0)
    }

    #[test]
    fn succeeds_first_try() {
        let mut calls = 0;
        let out = policy().run("op", || {
            calls += 1;
            Ok::<_, AppError>(42)
        });
        assert_eq!(out.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn transient_failures_consume_the_budget() {
        let mut calls = 0;
        let out: AppResult<()> = policy().run("op", || {
            calls += 1;
            Err(AppError::StoreUnavailable("down".to_string()))
        });
        assert!(out.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn recovers_after_transient_failure() {
        let mut calls = 0;
        let out = policy().run("op", || {
            calls += 1;
            if calls < 3 {
                Err(AppError::StoreUnavailable("down".to_string()))
            } else {
                Ok(7)
            }
        });
        assert_eq!(out.unwrap(), 7);
        assert_eq!(calls, 3);
    }

    #[test]
    fn data_errors_fail_fast() {
        let mut calls = 0;
        let out: AppResult<()> = policy().run("op", || {
            calls += 1;
            Err(AppError::InvalidKey("bad".to_string()))
        });
        assert!(out.is_err());
        assert_eq!(calls, 1);
    }
}
