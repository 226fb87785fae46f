use crate::cli::context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::Transition;
use crate::errors::AppResult;
use crate::ui::messages;

/// Resume a paused timer with a fresh running interval.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Resume {
        task,
        stage,
        user,
        key,
    } = cmd
    {
        let key = context::resolve_key(task, stage, user, key, cfg)?;
        let mut session = context::new_session(cfg)?;
        let (mut store, mut ledger) = context::open_adapters(cfg, &mut session)?;

        match session.resume(&mut store, &key) {
            Ok(Transition::Resumed) => {
                messages::timer(format!("Timer resumed for {}", key));
                context::oplog_quiet(cfg, "resume", &key.encode(), "timer resumed");
            }
            Ok(Transition::AlreadyRunning) => {
                messages::info(format!("Timer for {} is already running", key));
            }
            Ok(_) => {}
            Err(e) if e.is_transient() => {
                session.diag.report(format!("cannot persist resume: {}", e));
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
