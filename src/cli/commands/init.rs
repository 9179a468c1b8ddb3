use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the SQLite store
///  - the audit, users and business tables
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.clone(), cli.test)?;

    let mut cfg = Config::load()?;
    cfg.database = db_path.to_string_lossy().to_string();

    info("Initializing sheetcrm…");
    if !cli.test {
        info(format!("Config file : {}", Config::config_file().display()));
    }
    info(format!("Database    : {}", cfg.database));

    let store = super::open_store(&cfg)?;
    let tables = store.provision()?;

    success(format!(
        "Store ready at {} ({} tables: {})",
        cfg.database,
        tables.len(),
        tables.join(", ")
    ));
    Ok(())
}
