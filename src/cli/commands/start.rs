use crate::cli::context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::Transition;
use crate::errors::AppResult;
use crate::ui::messages;

/// Start (or restart) a timer for a task.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Start {
        task,
        stage,
        user,
        key,
    } = cmd
    {
        let key = context::resolve_key(task, stage, user, key, cfg)?;
        let mut session = context::new_session(cfg)?;
        let (mut store, mut ledger) = context::open_adapters(cfg, &mut session)?;

        match session.start(&mut store, key.clone()) {
            Ok(Transition::Started) => {
                messages::timer(format!("Timer started for {}", key));
                context::oplog_quiet(cfg, "start", &key.encode(), "timer started");
            }
            Ok(Transition::Restarted) => {
                // last writer wins: the previous timer for this key is gone
                messages::warning(format!("Timer for {} was already running, restarted", key));
                context::oplog_quiet(cfg, "start", &key.encode(), "timer restarted");
            }
            Ok(_) => {}
            Err(e) if e.is_transient() => {
                session.diag.report(format!("cannot persist timer: {}", e));
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
