use crate::cli::context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::Transition;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::time::format_seconds;

/// Stop a timer: settle its elapsed time into the ledger and remove it.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Stop {
        task,
        stage,
        user,
        key,
    } = cmd
    {
        let key = context::resolve_key(task, stage, user, key, cfg)?;
        let mut session = context::new_session(cfg)?;
        let (mut store, mut ledger) = context::open_adapters(cfg, &mut session)?;

        match session.stop(&mut store, &mut ledger, &key) {
            Ok(Transition::Stopped { elapsed_seconds }) => {
                messages::timer(format!(
                    "Timer stopped for {}: {} logged",
                    key,
                    format_seconds(elapsed_seconds)
                ));
                context::oplog_quiet(
                    cfg,
                    "stop",
                    &key.encode(),
                    &format!("timer stopped, {} s logged", elapsed_seconds),
                );
            }
            Ok(Transition::AlreadyStopped) => {
                // idempotent no-op, stays quiet on purpose
                messages::info(format!("No timer running for {}", key));
            }
            Ok(_) => {}
            Err(e) if e.is_transient() => {
                session.diag.report(format!("cannot settle timer: {}", e));
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
