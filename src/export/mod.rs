//! Writing table snapshots to files.

mod csv_out;
mod fs_utils;
mod json_out;

use crate::errors::AppResult;
use crate::models::TableSnapshot;
use crate::ui::messages::{info, success, warning};
use clap::ValueEnum;
use std::path::Path;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
        }
    }
}

/// Export one table snapshot. An existing file is only replaced with
/// `force` or after an interactive confirmation.
pub fn export_table(
    snap: &TableSnapshot,
    format: ExportFormat,
    path: &Path,
    force: bool,
) -> AppResult<()> {
    fs_utils::ensure_writable(path, force)?;

    if snap.is_empty() {
        warning(format!("Table '{}' has no data rows.", snap.table));
    }

    info(format!(
        "Exporting '{}' to {}: {}",
        snap.table,
        format.as_str(),
        path.display()
    ));
    match format {
        ExportFormat::Csv => csv_out::write_csv(snap, path)?,
        ExportFormat::Json => json_out::write_json(snap, path)?,
    }
    debug!(table = %snap.table, rows = snap.len(), path = %path.display(), "export written");

    success(format!(
        "{} export completed: {} row(s) -> {}",
        format.as_str(),
        snap.len(),
        path.display()
    ));
    Ok(())
}
