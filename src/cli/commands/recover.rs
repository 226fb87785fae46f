use crate::cli::context;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages;

/// Retry pass over entries buffered while the store was unreachable.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let mut session = context::new_session(cfg)?;

    if session.recovery.is_empty() {
        messages::info("Nothing to recover.");
        return Ok(());
    }

    let pending = session.recovery.len();
    match context::open_ledger(cfg) {
        Ok(mut ledger) => {
            let flushed = session.retry_pending(&mut ledger);
            if flushed > 0 {
                messages::success(format!(
                    "Recovered {} of {} buffered entr(y/ies)",
                    flushed, pending
                ));
                context::oplog_quiet(
                    cfg,
                    "recover",
                    "ledger",
                    &format!("{} buffered entries flushed", flushed),
                );
            }
            if !session.recovery.is_empty() {
                messages::warning(format!(
                    "{} entr(y/ies) still buffered, run `booktimer recover` again later",
                    session.recovery.len()
                ));
            }
        }
        Err(e) => {
            session.diag.report(format!("store still unreachable: {}", e));
        }
    }

    context::finish_session(cfg, &session);
    Ok(())
}
