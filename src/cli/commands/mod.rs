//! One handler per subcommand.

pub mod config;
pub mod export;
pub mod history;
pub mod init;
pub mod search;
pub mod show;
pub mod upsert;
pub mod users;

use crate::config::Config;
use crate::core::RecordStore;
use crate::db::SqliteStore;
use crate::errors::AppResult;
use std::sync::Arc;
use std::time::Duration;

/// Open the configured SQLite store and wrap it in a record store.
pub(crate) fn open_store(cfg: &Config) -> AppResult<RecordStore> {
    let store = SqliteStore::open(&cfg.database, Duration::from_millis(cfg.remote_timeout_ms))?;
    Ok(RecordStore::new(Arc::new(store), cfg))
}
