use crate::errors::AppResult;
use crate::models::TableSnapshot;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Array of objects keyed by column name, columns in table order.
pub(crate) fn write_json(snap: &TableSnapshot, path: &Path) -> AppResult<()> {
    let json = serde_json::to_string_pretty(&snap.records())?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
