use crate::cli::context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::Transition;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::time::format_seconds;

/// Pause a running timer, freezing its accumulated time.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Pause {
        task,
        stage,
        user,
        key,
    } = cmd
    {
        let key = context::resolve_key(task, stage, user, key, cfg)?;
        let mut session = context::new_session(cfg)?;
        let (mut store, mut ledger) = context::open_adapters(cfg, &mut session)?;

        match session.pause(&mut store, &key) {
            Ok(Transition::Paused {
                accumulated_seconds,
            }) => {
                messages::timer(format!(
                    "Timer paused for {} at {}",
                    key,
                    format_seconds(accumulated_seconds)
                ));
                context::oplog_quiet(cfg, "pause", &key.encode(), "timer paused");
            }
            Ok(Transition::AlreadyPaused) => {
                messages::info(format!("Timer for {} is already paused", key));
            }
            Ok(_) => {}
            Err(e) if e.is_transient() => {
                session.diag.report(format!("cannot persist pause: {}", e));
                context::salvage_running_timers(&mut session, &mut ledger);
                context::finish_session(cfg, &session);
                return Err(e);
            }
            Err(e) => return Err(e),
        }

        context::finish_session(cfg, &session);
    }

    Ok(())
}
