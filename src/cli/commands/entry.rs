use crate::cli::context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::LedgerWriter;
use crate::errors::{AppError, AppResult};
use crate::models::time_entry::{SOURCE_MANUAL, TimeEntry};
use crate::models::timer_key::TimerKey;
use crate::ui::messages;
use crate::utils::date::parse_date;
use crate::utils::time::{format_seconds, parse_duration};
use chrono::{NaiveTime, TimeZone, Utc};

/// Add a manual time entry to the ledger.
///
/// Validation errors (bad duration, bad date) are reported immediately and
/// mutate nothing; there is no retry for them.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Entry {
        task,
        stage,
        user,
        duration,
        date,
    } = cmd
    {
        let user = user.as_deref().unwrap_or(&cfg.default_user);
        let key = TimerKey::new(task, stage, user)?;
        let elapsed = parse_duration(duration)?;

        let day = match date {
            Some(raw) => parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.clone()))?,
            None => crate::utils::date::today(),
        };
        // manual entries carry the day, not a wall-clock instant
        let session_start = Utc.from_utc_datetime(
            &day.and_time(NaiveTime::default()),
        );

        let mut entry = TimeEntry::new(key.clone(), elapsed, session_start, SOURCE_MANUAL);
        entry.meta = "manual entry".to_string();

        let policy = context::retry_policy(cfg);
        let mut ledger = context::open_ledger(cfg)?;
        policy.run("manual ledger append", || ledger.append_entry(&entry))?;

        messages::success(format!(
            "Logged {} on {} for {}",
            format_seconds(elapsed),
            day,
            key
        ));
        context::oplog_quiet(
            cfg,
            "entry",
            &key.encode(),
            &format!("manual entry, {} s on {}", elapsed, day),
        );
    }

    Ok(())
}
