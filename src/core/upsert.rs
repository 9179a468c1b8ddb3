//! Update-if-found, else insert, against one remote table.
//!
//! The match-then-write sequence is not atomic on the remote side: two
//! concurrent upserts of the same new identity can both miss and both
//! append. Re-running a failed upsert is safe because the next attempt
//! re-matches the same row.

use super::audit::AuditLog;
use super::cache::TableCache;
use super::columns::{ensure_columns, require_identity_columns};
use super::matcher::{KeyMatcher, RowRef};
use super::mirror::TableMirror;
use super::normalize::FieldNormalizer;
use crate::errors::{AppError, AppResult};
use crate::models::audit::{AuditAction, AuditEntry};
use crate::models::identity::Identity;
use crate::models::record::{FIRST_DATA_ROW, Record, TableSnapshot};
use crate::models::value::FieldValue;
use crate::remote::RemoteStore;
use crate::utils::clock::Clock;
use crate::utils::date::format_canonical;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A non-fatal problem met while completing an otherwise successful write.
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    AuditWriteFailed { table: String, reason: String },
    MirrorFailed { target: String, reason: String },
    DuplicateIdentity { table: String, rows: Vec<usize> },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::AuditWriteFailed { table, reason } => {
                write!(f, "audit entry for '{table}' not recorded: {reason}")
            }
            Degradation::MirrorFailed { target, reason } => {
                write!(f, "mirror into '{target}' failed: {reason}")
            }
            Degradation::DuplicateIdentity { table, rows } => {
                let rows: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
                write!(
                    f,
                    "'{table}' has several rows for this identity (rows {}); the first was used",
                    rows.join(", ")
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorOutcome {
    pub table: String,
    pub action: AuditAction,
    pub row: usize,
    pub degradations: Vec<Degradation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub action: AuditAction,
    pub table: String,
    pub identity: Identity,
    /// Remote row number written, as observed by this writer.
    pub row: usize,
    /// Cells actually written, by column name.
    pub written: Record,
    pub description: String,
    pub mirrored: Option<MirrorOutcome>,
    pub degradations: Vec<Degradation>,
}

/// Result of a single-table write, shared with the mirror.
pub(crate) struct WriteResult {
    pub action: AuditAction,
    pub row: usize,
    pub before: Option<Record>,
    pub written: Record,
}

/// Write `payload` over the matched row, one cell per known column.
pub(crate) fn apply_update(
    store: &dyn RemoteStore,
    snap: &TableSnapshot,
    hit: &RowRef,
    payload: &Record,
) -> AppResult<WriteResult> {
    let before = snap.record(hit.index).unwrap_or_default();
    let row = hit.remote_row();
    let mut written = Record::new();

    for (col, name) in snap.header.iter().enumerate() {
        let Some(value) = payload.get(name) else {
            continue;
        };
        store
            .update_cell(&snap.table, row, col + 1, value)
            .map_err(|e| AppError::remote(&snap.table, format!("update row {row}, column '{name}'"), e))?;
        written.insert(name.clone(), value.clone());
    }

    Ok(WriteResult {
        action: AuditAction::Update,
        row,
        before: Some(before),
        written,
    })
}

/// Append `payload` as a new row in header order; absent columns are empty.
pub(crate) fn apply_insert(
    store: &dyn RemoteStore,
    snap: &TableSnapshot,
    payload: &Record,
) -> AppResult<WriteResult> {
    let values: Vec<String> = snap
        .header
        .iter()
        .map(|h| payload.get(h).cloned().unwrap_or_default())
        .collect();

    store
        .append_row(&snap.table, &values)
        .map_err(|e| AppError::remote(&snap.table, "append row", e))?;

    let written: Record = snap
        .header
        .iter()
        .zip(values)
        .filter(|(h, _)| payload.contains_key(h))
        .map(|(h, v)| (h.clone(), v))
        .collect();

    Ok(WriteResult {
        action: AuditAction::Insert,
        row: snap.len() + FIRST_DATA_ROW,
        before: None,
        written,
    })
}

pub struct UpsertEngine {
    cache: Arc<TableCache>,
    normalizer: Arc<FieldNormalizer>,
    matcher: KeyMatcher,
    audit: Arc<AuditLog>,
    mirror: TableMirror,
    clock: Arc<dyn Clock>,
    primary_table: String,
    protected_tables: Vec<String>,
    required_columns: BTreeMap<String, Vec<String>>,
}

impl UpsertEngine {
    pub fn new(
        cache: Arc<TableCache>,
        normalizer: Arc<FieldNormalizer>,
        audit: Arc<AuditLog>,
        clock: Arc<dyn Clock>,
        primary_table: &str,
        required_columns: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let rules = normalizer.rules();
        let matcher = KeyMatcher::new(&rules.name_field, &rules.phone_field);
        let mirror = TableMirror::new(
            Arc::clone(&cache),
            matcher.clone(),
            Arc::clone(&audit),
            Arc::clone(&clock),
            primary_table,
            required_columns.get(primary_table).cloned().unwrap_or_default(),
        );
        Self {
            cache,
            normalizer,
            matcher,
            protected_tables: vec![audit.table().to_string()],
            audit,
            mirror,
            clock,
            primary_table: primary_table.to_string(),
            required_columns,
        }
    }

    /// Tables the engine must never write to (the audit trail, the user store).
    pub fn protect_table(mut self, table: &str) -> Self {
        self.protected_tables.push(table.to_string());
        self
    }

    pub fn matcher(&self) -> &KeyMatcher {
        &self.matcher
    }

    fn validate(&self, table: &str, identity: &Identity) -> AppResult<()> {
        if table.trim().is_empty() {
            return Err(AppError::Validation("table name is required".into()));
        }
        if self.protected_tables.iter().any(|t| t == table) {
            return Err(AppError::Validation(format!(
                "'{table}' cannot be written through upsert"
            )));
        }
        if identity.name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{} is required",
                self.matcher.name_field()
            )));
        }
        if identity.key().phone.is_empty() {
            return Err(AppError::Validation(format!(
                "{} must contain digits",
                self.matcher.phone_field()
            )));
        }
        Ok(())
    }

    /// Normalize the payload, add the identity columns and fill defaults.
    /// Defaults are written like supplied fields, on update as well as insert.
    fn prepare(&self, identity: &Identity, fields: &Record<FieldValue>) -> Record {
        let rules = self.normalizer.rules();
        let mut payload: Record = fields
            .iter()
            .map(|(k, v)| (k.to_string(), self.normalizer.normalize(k, v)))
            .collect();

        if !payload.contains_key(&rules.name_field) {
            let v = self
                .normalizer
                .normalize(&rules.name_field, &FieldValue::from(identity.name.trim()));
            payload.insert(rules.name_field.clone(), v);
        }
        if !payload.contains_key(&rules.phone_field) {
            let v = self
                .normalizer
                .normalize(&rules.phone_field, &FieldValue::from(identity.phone.trim()));
            payload.insert(rules.phone_field.clone(), v);
        }

        if !payload.contains_key(&rules.date_received_field) {
            payload.insert(
                rules.date_received_field.clone(),
                format_canonical(self.clock.today()),
            );
        }

        if payload.text(&rules.staff_email_field).is_empty() {
            payload.insert(
                rules.staff_email_field.clone(),
                self.normalizer.fallback_staff_email().to_string(),
            );
        }

        if payload.text(&rules.whatsapp_field).is_empty() {
            let phone = payload.text(&rules.phone_field).trim().to_string();
            if !phone.is_empty() {
                payload.insert(rules.whatsapp_field.clone(), phone);
            }
        }

        payload
    }

    pub fn upsert(
        &self,
        table: &str,
        identity: &Identity,
        fields: &Record<FieldValue>,
        mirror: bool,
    ) -> AppResult<UpsertOutcome> {
        self.validate(table, identity)?;

        if let Some(required) = self.required_columns.get(table) {
            ensure_columns(&self.cache, table, required)?;
        }

        let snap = self.cache.get_fresh(table)?;
        require_identity_columns(&snap, &self.matcher)?;

        let payload = self.prepare(identity, fields);
        let dropped: Vec<&str> = payload
            .keys()
            .filter(|k| snap.column_index(k).is_none())
            .collect();
        if !dropped.is_empty() {
            debug!(table, ?dropped, "dropping fields with no matching column");
        }

        let mut degradations = Vec::new();
        let store = self.cache.store().as_ref();
        let result = match self.matcher.find(&snap, identity) {
            Some(hit) => {
                degradations.extend(hit.duplicate_degradation(table));
                apply_update(store, &snap, &hit, &payload)
            }
            None => apply_insert(store, &snap, &payload),
        };
        // Whatever happened remotely, the cached copy is now suspect.
        self.cache.invalidate(table);
        let write = result?;

        info!(
            table,
            identity = %identity,
            action = %write.action,
            row = write.row,
            cells = write.written.len(),
            "record written"
        );

        let entry = AuditEntry {
            timestamp: self.clock.now(),
            action: write.action,
            table_name: table.to_string(),
            identity_name: identity.name.trim().to_string(),
            identity_phone: identity.phone.trim().to_string(),
            before: write.before,
            after: write.written.clone(),
        };
        if let Err(e) = self.audit.append(&entry) {
            warn!(table, identity = %identity, error = %e, "audit write failed; business write kept");
            degradations.push(Degradation::AuditWriteFailed {
                table: table.to_string(),
                reason: e.to_string(),
            });
        }

        let mut mirrored = None;
        if mirror && write.action == AuditAction::Insert && table != self.primary_table {
            match self.mirror.mirror(table, identity, &payload) {
                Ok(outcome) => {
                    degradations.extend(outcome.degradations.iter().cloned());
                    mirrored = Some(outcome);
                }
                Err(e) => {
                    warn!(
                        source = table,
                        target = %self.primary_table,
                        identity = %identity,
                        error = %e,
                        "mirror failed; source write kept"
                    );
                    degradations.push(Degradation::MirrorFailed {
                        target: self.primary_table.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let description = match write.action {
            AuditAction::Update => format!("Updated existing record for {identity}"),
            AuditAction::Insert => format!("Inserted new record for {identity}"),
        };

        Ok(UpsertOutcome {
            action: write.action,
            table: table.to_string(),
            identity: identity.clone(),
            row: write.row,
            written: write.written,
            description,
            mirrored,
            degradations,
        })
    }
}
