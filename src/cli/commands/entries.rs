use crate::cli::context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::ledger::LedgerFilter;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::date::parse_period;
use crate::utils::table::{Column, Table};
use crate::utils::time::format_seconds;

/// List completed time entries from the ledger.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Entries {
        period,
        task,
        stage,
        user,
    } = cmd
    {
        let mut filter = LedgerFilter {
            task: task.clone(),
            stage: stage.clone(),
            user: user.clone(),
            ..LedgerFilter::default()
        };
        if let Some(p) = period {
            filter.dates = Some(parse_period(p)?);
        }

        let mut ledger = context::open_ledger(cfg)?;
        let rows = ledger.list_entries(&filter)?;

        if rows.is_empty() {
            messages::info("No time entries match.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("DATE", 10),
            Column::new("TASK", 28),
            Column::new("STAGE", 16),
            Column::new("USER", 12),
            Column::new("ELAPSED", 9),
            Column::new("SOURCE", 8),
        ]);

        let mut total = 0i64;
        for row in &rows {
            total += row.elapsed_seconds;
            table.add_row(vec![
                row.entry_date.clone(),
                row.task.clone(),
                row.stage.clone(),
                row.user.clone(),
                format_seconds(row.elapsed_seconds),
                row.source.clone(),
            ]);
        }

        print!("{}", table.render());
        println!(
            "{} entr(y/ies), {} total",
            rows.len(),
            format_seconds(total)
        );
    }

    Ok(())
}
