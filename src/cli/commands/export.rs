use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::export_table;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        table,
        format,
        file,
        force,
    } = cmd
    {
        let store = super::open_store(cfg)?;
        let snap = store.read_table(table)?;
        export_table(&snap, *format, Path::new(file), *force)?;
    }
    Ok(())
}
