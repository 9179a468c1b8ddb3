use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, warning};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Search { table, query } = cmd {
        let store = super::open_store(cfg)?;
        let hits = store.search(table, query)?;

        if hits.is_empty() {
            warning(format!("No match for '{query}' in '{table}'."));
            return Ok(());
        }

        let snap = store.read_table(table)?;
        let mut out = Table::new(snap.header.clone());
        for rec in &hits {
            out.add_row(snap.header.iter().map(|h| rec.text(h).to_string()).collect());
        }
        print!("{}", out.render());
        info(format!("{} match(es)", hits.len()));
    }
    Ok(())
}
