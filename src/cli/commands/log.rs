use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;

fn strip_ansi(s: &str) -> String {
    let re = regex::Regex::new(r"\x1B\[[0-9;]*[mK]").unwrap();
    re.replace_all(s, "").into_owned()
}

/// ANSI colour per operation kind.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "start" => Colour::Green,
        "stop" => Colour::Red,
        "pause" | "resume" => Colour::Yellow,
        "entry" => Colour::Cyan,
        "recover" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

/// Print the internal `log` table.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if !matches!(cmd, Commands::Log { print: true }) {
        return Ok(());
    }

    let pool = DbPool::new(&cfg.database)?;
    let mut stmt = pool
        .conn
        .prepare_cached("SELECT id, date, operation, target, message FROM log ORDER BY id ASC")?;

    let rows = stmt.query_map([], |row| {
        let id: i64 = row.get(0)?;
        let raw_date: String = row.get(1)?;
        let operation: String = row.get(2)?;
        let target: String = row.get(3)?;
        let message: String = row.get(4)?;

        let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
            .map(|dt| dt.format("%FT%T%:z").to_string())
            .unwrap_or(raw_date);

        let op_target = if target.is_empty() {
            operation.clone()
        } else {
            format!("{operation} ({target})")
        };

        Ok((id, date, operation, op_target, message))
    })?;

    let mut entries = Vec::new();
    for r in rows {
        entries.push(r?);
    }

    let op_width = entries
        .iter()
        .map(|(_, _, _, op_target, _)| strip_ansi(op_target).chars().count())
        .max()
        .unwrap_or(8)
        .min(40);

    for (id, date, operation, op_target, message) in &entries {
        let colour = color_for_operation(operation);
        // pad manually: the ANSI escapes would throw off format!'s width
        let pad = " ".repeat(op_width.saturating_sub(op_target.chars().count()));
        println!(
            "{:>4}  {}  {}{}  {}",
            id,
            date,
            colour.paint(op_target.as_str()),
            pad,
            message
        );
    }

    if entries.is_empty() {
        println!("(log is empty)");
    }

    Ok(())
}
