//! Timer lifecycle controller.
//!
//! `TimerSession` is the explicit context object for one sequence of timer
//! operations: it mirrors the store's active timers in local memory, owns
//! the recovery buffer and the diagnostic log, and drives the
//! `ABSENT → RUNNING ⇄ PAUSED → removed` state machine. Every store and
//! ledger write goes through the bounded retry policy.

use crate::core::clock::{Clock, elapsed_seconds};
use crate::core::diag::DiagnosticLog;
use crate::core::recovery::RecoveryBuffer;
use crate::core::retry::RetryPolicy;
use crate::errors::{AppError, AppResult};
use crate::models::time_entry::{SOURCE_RECOVERY, SOURCE_TIMER, TimeEntry};
use crate::models::timer_key::TimerKey;
use crate::models::timer_state::TimerStateRecord;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Persistence seam for active timers. Upsert semantics by timer key:
/// concurrent writers resolve last-write-wins, no versioning.
pub trait TimerStore {
    fn load_all(&mut self) -> AppResult<Vec<TimerStateRecord>>;
    fn save(&mut self, record: &TimerStateRecord) -> AppResult<()>;
    fn update_state(
        &mut self,
        key: &TimerKey,
        accumulated_seconds: i64,
        is_paused: bool,
        start_time: Option<DateTime<Utc>>,
    ) -> AppResult<()>;
    fn delete(&mut self, key: &TimerKey) -> AppResult<()>;
}

/// Ledger seam. `append_entry` must be idempotent under the entry's
/// natural key so a repeated settlement cannot duplicate a row.
pub trait LedgerWriter {
    fn append_entry(&mut self, entry: &TimeEntry) -> AppResult<()>;
}

/// Outcome of a lifecycle call, for user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started,
    /// Start on an already-tracked key: previous timer overwritten,
    /// last writer wins.
    Restarted,
    Paused { accumulated_seconds: i64 },
    AlreadyPaused,
    Resumed,
    AlreadyRunning,
    Stopped { elapsed_seconds: i64 },
    /// Stop on an absent key: idempotent no-op.
    AlreadyStopped,
}

pub struct TimerSession<C: Clock> {
    clock: C,
    retry: RetryPolicy,
    active: HashMap<String, TimerStateRecord>,
    pub recovery: RecoveryBuffer,
    pub diag: DiagnosticLog,
}

impl<C: Clock> TimerSession<C> {
    pub fn new(clock: C, retry: RetryPolicy) -> Self {
        Self {
            clock,
            retry,
            active: HashMap::new(),
            recovery: RecoveryBuffer::new(),
            diag: DiagnosticLog::new(),
        }
    }

    /// Reload the local mirror from the store, picking up timers that were
    /// running before a process restart.
    pub fn rehydrate(&mut self, store: &mut dyn TimerStore) -> AppResult<()> {
        let records = self.retry.run("load active timers", || store.load_all())?;
        self.active.clear();
        for rec in records {
            self.active.insert(rec.key.encode(), rec);
        }
        Ok(())
    }

    /// ABSENT → RUNNING. Starting an already-tracked key overwrites it.
    /// Persisted immediately so a crash right after Start keeps the timer.
    pub fn start(&mut self, store: &mut dyn TimerStore, key: TimerKey) -> AppResult<Transition> {
        let record = TimerStateRecord::started(key, self.clock.now_utc());
        self.retry.run("save timer", || store.save(&record))?;

        let overwrote = self.active.insert(record.key.encode(), record).is_some();
        Ok(if overwrote {
            Transition::Restarted
        } else {
            Transition::Started
        })
    }

    /// RUNNING → PAUSED. Freezes the running interval into the accumulated
    /// total; start_time is left stale while paused.
    pub fn pause(&mut self, store: &mut dyn TimerStore, key: &TimerKey) -> AppResult<Transition> {
        let encoded = key.encode();
        let record = self
            .active
            .get(&encoded)
            .ok_or_else(|| AppError::TimerNotFound(key.to_string()))?;

        if record.is_paused {
            return Ok(Transition::AlreadyPaused);
        }

        let elapsed = elapsed_seconds(record.start_time, self.clock.now_utc());
        let accumulated = record.accumulated_seconds + elapsed;

        self.retry.run("pause timer", || {
            store.update_state(key, accumulated, true, None)
        })?;

        if let Some(rec) = self.active.get_mut(&encoded) {
            rec.accumulated_seconds = accumulated;
            rec.is_paused = true;
        }
        Ok(Transition::Paused {
            accumulated_seconds: accumulated,
        })
    }

    /// PAUSED → RUNNING. Opens a fresh running interval; the accumulated
    /// total is untouched.
    pub fn resume(&mut self, store: &mut dyn TimerStore, key: &TimerKey) -> AppResult<Transition> {
        let encoded = key.encode();
        let record = self
            .active
            .get(&encoded)
            .ok_or_else(|| AppError::TimerNotFound(key.to_string()))?;

        if !record.is_paused {
            return Ok(Transition::AlreadyRunning);
        }

        let now = self.clock.now_utc();
        let accumulated = record.accumulated_seconds;

        self.retry.run("resume timer", || {
            store.update_state(key, accumulated, false, Some(now))
        })?;

        if let Some(rec) = self.active.get_mut(&encoded) {
            rec.start_time = now;
            rec.is_paused = false;
        }
        Ok(Transition::Resumed)
    }

    /// RUNNING or PAUSED → removed. Settles the final elapsed total, writes
    /// exactly one ledger entry (zero-duration stops included), then deletes
    /// the store record. Stopping an absent key is a silent no-op.
    pub fn stop(
        &mut self,
        store: &mut dyn TimerStore,
        ledger: &mut dyn LedgerWriter,
        key: &TimerKey,
    ) -> AppResult<Transition> {
        let encoded = key.encode();
        let Some(record) = self.active.get(&encoded) else {
            return Ok(Transition::AlreadyStopped);
        };

        let elapsed = if record.is_paused {
            record.accumulated_seconds
        } else {
            record.accumulated_seconds + elapsed_seconds(record.start_time, self.clock.now_utc())
        };

        let entry = TimeEntry::new(record.key.clone(), elapsed, record.start_time, SOURCE_TIMER);
        self.retry
            .run("ledger append", || ledger.append_entry(&entry))?;

        // Entry is settled at this point. A failed delete leaves a stale
        // store record; re-stopping it later is harmless because the
        // ledger upsert dedupes on the natural key.
        if let Err(e) = self.retry.run("delete timer", || store.delete(key)) {
            self.diag
                .report(format!("timer {} settled but not removed: {}", key, e));
        }

        self.active.remove(&encoded);
        Ok(Transition::Stopped {
            elapsed_seconds: elapsed,
        })
    }

    /// Live elapsed total for display: accumulated plus the open interval.
    pub fn live_elapsed(&self, record: &TimerStateRecord) -> i64 {
        if record.is_paused {
            record.accumulated_seconds
        } else {
            record.accumulated_seconds
                + elapsed_seconds(record.start_time, self.clock.now_utc())
        }
    }

    /// Active timers in the local mirror, ordered by key for stable output.
    pub fn active_timers(&self) -> Vec<&TimerStateRecord> {
        let mut records: Vec<_> = self.active.values().collect();
        records.sort_by_key(|r| r.key.encode());
        records
    }

    /// Emergency recovery: the store is unreachable, so salvage every timer
    /// this process still holds as running by writing its elapsed time
    /// straight to the ledger. Failed writes are buffered for a later retry
    /// pass. Returns (entries written, entries buffered).
    pub fn emergency_flush(&mut self, ledger: &mut dyn LedgerWriter) -> (usize, usize) {
        let now = self.clock.now_utc();
        let running: Vec<String> = self
            .active
            .iter()
            .filter(|(_, r)| !r.is_paused)
            .map(|(k, _)| k.clone())
            .collect();

        let mut written = 0;
        let mut buffered = 0;

        for encoded in running {
            let Some(record) = self.active.remove(&encoded) else {
                continue;
            };
            let elapsed =
                record.accumulated_seconds + elapsed_seconds(record.start_time, now);
            let entry = TimeEntry::new(record.key, elapsed, record.start_time, SOURCE_RECOVERY);

            match self
                .retry
                .run("ledger append (recovery)", || ledger.append_entry(&entry))
            {
                Ok(()) => written += 1,
                Err(e) => {
                    self.diag
                        .report(format!("recovery write failed, entry buffered: {}", e));
                    self.recovery.push(entry);
                    buffered += 1;
                }
            }
        }

        (written, buffered)
    }

    /// Retry pass over the recovery buffer. Returns how many entries were
    /// flushed to the ledger; the rest stay buffered.
    pub fn retry_pending(&mut self, ledger: &mut dyn LedgerWriter) -> usize {
        self.recovery.flush(ledger, &self.retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Clock that only moves when told to.
    #[derive(Clone)]
    struct FakeClock {
        now: Rc<Cell<DateTime<Utc>>>,
    }

    impl FakeClock {
        fn at(start: DateTime<Utc>) -> Self {
            Self {
                now: Rc::new(Cell::new(start)),
            }
        }

        fn advance(&self, secs: i64) {
            self.now.set(self.now.get() + Duration::seconds(secs));
        }
    }

    impl Clock for FakeClock {
        fn now_utc(&self) -> DateTime<Utc> {
            self.now.get()
        }
    }

    #[derive(Default)]
    struct MemStore {
        records: HashMap<String, TimerStateRecord>,
    }

    impl TimerStore for MemStore {
        fn load_all(&mut self) -> AppResult<Vec<TimerStateRecord>> {
            Ok(self.records.values().cloned().collect())
        }

        fn save(&mut self, record: &TimerStateRecord) -> AppResult<()> {
            self.records.insert(record.key.encode(), record.clone());
            Ok(())
        }

        fn update_state(
            &mut self,
            key: &TimerKey,
            accumulated_seconds: i64,
            is_paused: bool,
            start_time: Option<DateTime<Utc>>,
        ) -> AppResult<()> {
            let rec = self
                .records
                .get_mut(&key.encode())
                .ok_or_else(|| AppError::TimerNotFound(key.to_string()))?;
            rec.accumulated_seconds = accumulated_seconds;
            rec.is_paused = is_paused;
            if let Some(t) = start_time {
                rec.start_time = t;
            }
            Ok(())
        }

        fn delete(&mut self, key: &TimerKey) -> AppResult<()> {
            self.records.remove(&key.encode());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemLedger {
        entries: Vec<TimeEntry>,
    }

    impl LedgerWriter for MemLedger {
        fn append_entry(&mut self, entry: &TimeEntry) -> AppResult<()> {
            // natural-key dedupe, like the SQLite upsert
            let dup = self.entries.iter().any(|e| {
                e.key == entry.key
                    && e.entry_date() == entry.entry_date()
                    && e.elapsed_seconds == entry.elapsed_seconds
            });
            if !dup {
                self.entries.push(entry.clone());
            }
            Ok(())
        }
    }

    /// Ledger whose writes can be switched on and off mid-test.
    struct FlakyLedger {
        inner: MemLedger,
        down: bool,
    }

    impl LedgerWriter for FlakyLedger {
        fn append_entry(&mut self, entry: &TimeEntry) -> AppResult<()> {
            if self.down {
                return Err(AppError::StoreUnavailable("ledger down".to_string()));
            }
            self.inner.append_entry(entry)
        }
    }

    fn key() -> TimerKey {
        TimerKey::new("My Book", "1st Edit", "jane").unwrap()
    }

    fn session(clock: &FakeClock) -> TimerSession<FakeClock> {
        TimerSession::new(clock.clone(), RetryPolicy::new(3, 0))
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-04-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn start_pause_resume_stop_sums_running_intervals() {
        // Start 10:00:00, Pause 10:00:30, Resume 10:01:00, Stop 10:02:00
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut ledger = MemLedger::default();
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();

        clock.advance(30);
        let out = session.pause(&mut store, &key()).unwrap();
        assert_eq!(
            out,
            Transition::Paused {
                accumulated_seconds: 30
            }
        );

        clock.advance(30);
        session.resume(&mut store, &key()).unwrap();

        clock.advance(60);
        let out = session.stop(&mut store, &mut ledger, &key()).unwrap();
        assert_eq!(out, Transition::Stopped { elapsed_seconds: 90 });

        assert_eq!(ledger.entries.len(), 1);
        assert_eq!(ledger.entries[0].elapsed_seconds, 90);
        assert!(store.records.is_empty());
    }

    #[test]
    fn elapsed_is_independent_of_pause_cycle_count() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut ledger = MemLedger::default();
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();
        // five 10s running intervals with idle gaps in between
        for _ in 0..5 {
            clock.advance(10);
            session.pause(&mut store, &key()).unwrap();
            clock.advance(600);
            session.resume(&mut store, &key()).unwrap();
        }
        let out = session.stop(&mut store, &mut ledger, &key()).unwrap();
        assert_eq!(out, Transition::Stopped { elapsed_seconds: 50 });
    }

    #[test]
    fn stop_is_idempotent() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut ledger = MemLedger::default();
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();
        clock.advance(10);
        session.stop(&mut store, &mut ledger, &key()).unwrap();

        let out = session.stop(&mut store, &mut ledger, &key()).unwrap();
        assert_eq!(out, Transition::AlreadyStopped);
        assert_eq!(ledger.entries.len(), 1);
    }

    #[test]
    fn pause_while_paused_is_a_noop() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();
        clock.advance(60);
        session.pause(&mut store, &key()).unwrap();

        clock.advance(60);
        let out = session.pause(&mut store, &key()).unwrap();
        assert_eq!(out, Transition::AlreadyPaused);

        let rec = &store.records[&key().encode()];
        assert_eq!(rec.accumulated_seconds, 60);
        assert!(rec.is_paused);
    }

    #[test]
    fn paused_timer_accrues_nothing() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();
        clock.advance(60);
        session.pause(&mut store, &key()).unwrap();

        clock.advance(3600);
        let rec = session.active_timers()[0];
        assert_eq!(session.live_elapsed(rec), 60);
    }

    #[test]
    fn start_overwrites_existing_timer() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut session = session(&clock);

        assert_eq!(session.start(&mut store, key()).unwrap(), Transition::Started);
        clock.advance(120);
        assert_eq!(
            session.start(&mut store, key()).unwrap(),
            Transition::Restarted
        );

        // last writer wins: the old 120s are gone
        let rec = &store.records[&key().encode()];
        assert_eq!(rec.accumulated_seconds, 0);
        assert_eq!(rec.start_time, clock.now_utc());
    }

    #[test]
    fn pause_on_absent_timer_is_an_error() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut session = session(&clock);

        let out = session.pause(&mut store, &key());
        assert!(matches!(out, Err(AppError::TimerNotFound(_))));
    }

    #[test]
    fn zero_duration_stop_still_writes_an_entry() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut ledger = MemLedger::default();
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();
        let out = session.stop(&mut store, &mut ledger, &key()).unwrap();
        assert_eq!(out, Transition::Stopped { elapsed_seconds: 0 });
        assert_eq!(ledger.entries.len(), 1);
        assert_eq!(ledger.entries[0].elapsed_seconds, 0);
    }

    #[test]
    fn rehydrate_picks_up_persisted_timers() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        {
            let mut session = session(&clock);
            session.start(&mut store, key()).unwrap();
        }

        // fresh session, as after a process restart
        let mut session = session(&clock);
        session.rehydrate(&mut store).unwrap();
        clock.advance(45);
        let rec = session.active_timers()[0];
        assert_eq!(session.live_elapsed(rec), 45);
    }

    #[test]
    fn emergency_flush_writes_running_timers_to_ledger() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut ledger = MemLedger::default();
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();
        clock.advance(120);

        let (written, buffered) = session.emergency_flush(&mut ledger);
        assert_eq!((written, buffered), (1, 0));
        assert_eq!(ledger.entries[0].elapsed_seconds, 120);
        assert_eq!(ledger.entries[0].source, SOURCE_RECOVERY);
    }

    #[test]
    fn emergency_flush_buffers_when_ledger_is_down() {
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut ledger = FlakyLedger {
            inner: MemLedger::default(),
            down: true,
        };
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();
        clock.advance(120);

        let (written, buffered) = session.emergency_flush(&mut ledger);
        assert_eq!((written, buffered), (0, 1));
        assert_eq!(session.recovery.len(), 1);

        // ledger comes back: the retry pass drains the buffer
        ledger.down = false;
        assert_eq!(session.retry_pending(&mut ledger), 1);
        assert!(session.recovery.is_empty());
        assert_eq!(ledger.inner.entries[0].elapsed_seconds, 120);
    }

    #[test]
    fn emergency_flush_skips_paused_timers() {
        // a paused timer's total is already persisted, nothing to salvage
        let clock = FakeClock::at(t0());
        let mut store = MemStore::default();
        let mut ledger = MemLedger::default();
        let mut session = session(&clock);

        session.start(&mut store, key()).unwrap();
        clock.advance(30);
        session.pause(&mut store, &key()).unwrap();

        let (written, buffered) = session.emergency_flush(&mut ledger);
        assert_eq!((written, buffered), (0, 0));
    }
}
