//! Append-only audit trail kept in its own table.
//!
//! There is deliberately no update or delete path here.

use super::cache::TableCache;
use crate::errors::{AppError, AppResult};
use crate::models::audit::{AUDIT_HEADER, AuditEntry};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct AuditLog {
    cache: Arc<TableCache>,
    table: String,
}

impl AuditLog {
    pub fn new(cache: Arc<TableCache>, table: impl Into<String>) -> Self {
        Self {
            cache,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Append one entry. Values are laid out by the table's actual header,
    /// so a hand-reordered audit sheet still lines up.
    pub fn append(&self, entry: &AuditEntry) -> AppResult<()> {
        let store = self.cache.store();
        let snap = self.cache.get(&self.table)?;

        let header: Vec<String> = if snap.has_header() {
            snap.header.clone()
        } else {
            let canonical: Vec<String> = AUDIT_HEADER.iter().map(|h| h.to_string()).collect();
            store
                .append_row(&self.table, &canonical)
                .map_err(|e| AppError::remote(&self.table, "write audit header", e))?;
            canonical
        };

        let values = entry.to_row();
        let row: Vec<String> = header
            .iter()
            .map(|h| {
                AUDIT_HEADER
                    .iter()
                    .position(|a| a == h)
                    .map(|i| values[i].clone())
                    .unwrap_or_default()
            })
            .collect();

        let result = store
            .append_row(&self.table, &row)
            .map_err(|e| AppError::remote(&self.table, "append audit entry", e));
        self.cache.invalidate(&self.table);
        result?;

        debug!(
            table = %entry.table_name,
            action = %entry.action,
            identity = %entry.identity_name,
            "audit entry appended"
        );
        Ok(())
    }

    /// All entries, newest first. Malformed rows are skipped.
    pub fn entries(&self) -> AppResult<Vec<AuditEntry>> {
        let snap = self.cache.get(&self.table)?;
        let mut out = Vec::with_capacity(snap.len());
        for (i, rec) in snap.records().iter().enumerate() {
            match AuditEntry::from_record(rec) {
                Some(entry) => out.push(entry),
                None => warn!(
                    table = %self.table,
                    row = crate::models::record::TableSnapshot::remote_row_number(i),
                    "skipping malformed audit row"
                ),
            }
        }
        out.reverse();
        Ok(out)
    }
}
