use super::cache::TableCache;
use super::matcher::KeyMatcher;
use crate::errors::{AppError, AppResult};
use crate::models::record::TableSnapshot;
use tracing::info;

/// Append any of `required` missing from `table`'s header. Tables without
/// a header row are left alone.
pub fn ensure_columns(cache: &TableCache, table: &str, required: &[String]) -> AppResult<()> {
    if required.is_empty() {
        return Ok(());
    }
    let snap = cache.get_fresh(table)?;
    if !snap.has_header() {
        return Ok(());
    }

    let mut added = false;
    for col in required.iter().filter(|c| snap.column_index(c).is_none()) {
        let result = cache
            .store()
            .add_column(table, col)
            .map_err(|e| AppError::remote(table, format!("add column '{col}'"), e));
        if let Err(e) = result {
            if added {
                cache.invalidate(table);
            }
            return Err(e);
        }
        info!(table, column = %col, "appended required column");
        added = true;
    }
    if added {
        cache.invalidate(table);
    }
    Ok(())
}

/// Fail unless the snapshot carries both identity columns.
pub fn require_identity_columns(snap: &TableSnapshot, matcher: &KeyMatcher) -> AppResult<()> {
    for column in [matcher.name_field(), matcher.phone_field()] {
        if snap.column_index(column).is_none() {
            return Err(AppError::Schema {
                table: snap.table.clone(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
