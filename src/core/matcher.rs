//! Identity lookup over an in-memory snapshot.

use crate::models::identity::{Identity, IdentityKey};
use super::upsert::Degradation;
use crate::models::record::TableSnapshot;
use tracing::warn;

/// A matched data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRef {
    /// 0-based data-row index in the snapshot.
    pub index: usize,
    /// Other rows sharing the same identity key, in snapshot order.
    pub also_matched: Vec<usize>,
}

impl RowRef {
    pub fn remote_row(&self) -> usize {
        TableSnapshot::remote_row_number(self.index)
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.also_matched.is_empty()
    }

    /// `DuplicateIdentity` listing every matching remote row, first the
    /// one used. `None` when the match is unique.
    pub fn duplicate_degradation(&self, table: &str) -> Option<Degradation> {
        if !self.is_ambiguous() {
            return None;
        }
        let mut rows = vec![self.remote_row()];
        rows.extend(self.also_matched.iter().map(|i| TableSnapshot::remote_row_number(*i)));
        Some(Degradation::DuplicateIdentity {
            table: table.to_string(),
            rows,
        })
    }
}

#[derive(Debug, Clone)]
pub struct KeyMatcher {
    name_field: String,
    phone_field: String,
}

impl KeyMatcher {
    pub fn new(name_field: impl Into<String>, phone_field: impl Into<String>) -> Self {
        Self {
            name_field: name_field.into(),
            phone_field: phone_field.into(),
        }
    }

    pub fn name_field(&self) -> &str {
        &self.name_field
    }

    pub fn phone_field(&self) -> &str {
        &self.phone_field
    }

    pub fn row_key(&self, snap: &TableSnapshot, row: usize) -> IdentityKey {
        IdentityKey::from_parts(
            snap.cell(row, &self.name_field),
            snap.cell(row, &self.phone_field),
        )
    }

    /// First row whose normalized identity equals the query's. Missing
    /// identity columns read as empty.
    pub fn find(&self, snap: &TableSnapshot, identity: &Identity) -> Option<RowRef> {
        let key = identity.key();
        let mut hits = (0..snap.len()).filter(|&i| self.row_key(snap, i) == key);
        let index = hits.next()?;
        let also_matched: Vec<usize> = hits.collect();
        if !also_matched.is_empty() {
            warn!(
                table = %snap.table,
                identity = %identity,
                first_row = TableSnapshot::remote_row_number(index),
                duplicates = also_matched.len(),
                "duplicate identity rows; using the first"
            );
        }
        Some(RowRef {
            index,
            also_matched,
        })
    }
}
