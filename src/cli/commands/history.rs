use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::{AuditAction, AuditEntry};
use crate::ui::messages::{header, warning};
use ansi_term::Colour;

fn color_for_action(action: AuditAction) -> Colour {
    match action {
        AuditAction::Insert => Colour::Green,
        AuditAction::Update => Colour::Yellow,
    }
}

/// `col: old -> new` for updates, `col=value` for inserts.
fn describe_changes(entry: &AuditEntry) -> String {
    let parts: Vec<String> = entry
        .after
        .iter()
        .map(|(col, new)| match &entry.before {
            Some(before) => format!("{col}: '{}' -> '{new}'", before.text(col)),
            None => format!("{col}={new}"),
        })
        .collect();
    parts.join("; ")
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::History { limit } = cmd {
        let store = super::open_store(cfg)?;
        let entries = store.history(*limit)?;

        header(format!("History ({})", cfg.audit_table));
        if entries.is_empty() {
            warning("No audit entries yet.");
            return Ok(());
        }

        for e in &entries {
            println!(
                "{}  {}  {:<16} {} ({})",
                Colour::Fixed(244).paint(e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                color_for_action(e.action).bold().paint(format!("{:<6}", e.action.as_str())),
                e.table_name,
                e.identity_name,
                e.identity_phone,
            );
            let changes = describe_changes(e);
            if !changes.is_empty() {
                println!("        {changes}");
            }
        }
    }
    Ok(())
}
