use crate::cli::context;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::table::{Column, Table};
use crate::utils::time::format_seconds;

/// Show active timers with their live elapsed time.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let mut session = context::new_session(cfg)?;
    let (_store, _ledger) = context::open_adapters(cfg, &mut session)?;

    let records = session.active_timers();
    if records.is_empty() {
        messages::info("No active timers.");
        context::finish_session(cfg, &session);
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::new("TASK", 28),
        Column::new("STAGE", 16),
        Column::new("USER", 12),
        Column::new("STATE", 8),
        Column::new("ELAPSED", 9),
    ]);

    for rec in &records {
        table.add_row(vec![
            rec.key.task.clone(),
            rec.key.stage.clone(),
            rec.key.user.clone(),
            if rec.is_paused { "paused" } else { "running" }.to_string(),
            format_seconds(session.live_elapsed(rec)),
        ]);
    }

    print!("{}", table.render());
    context::finish_session(cfg, &session);
    Ok(())
}
