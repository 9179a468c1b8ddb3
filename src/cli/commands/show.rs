use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{header, info, warning};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Show { table } = cmd {
        let store = super::open_store(cfg)?;
        let snap = store.read_table(table)?;

        header(table);
        if snap.is_empty() {
            warning(format!("No rows in '{table}'."));
            return Ok(());
        }

        let mut out = Table::new(snap.header.clone());
        for row in &snap.rows {
            out.add_row(row.clone());
        }
        print!("{}", out.render());
        info(format!("{} row(s)", snap.len()));
    }
    Ok(())
}
