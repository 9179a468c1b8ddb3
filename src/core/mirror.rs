//! Copies a satellite insert into the primary table.

use super::audit::AuditLog;
use super::cache::TableCache;
use super::columns::{ensure_columns, require_identity_columns};
use super::matcher::KeyMatcher;
use super::upsert::{Degradation, MirrorOutcome, apply_insert, apply_update};
use crate::errors::AppResult;
use crate::models::audit::AuditEntry;
use crate::models::identity::Identity;
use crate::models::record::Record;
use crate::utils::clock::Clock;
use std::sync::Arc;
use tracing::{info, warn};

pub struct TableMirror {
    cache: Arc<TableCache>,
    matcher: KeyMatcher,
    audit: Arc<AuditLog>,
    clock: Arc<dyn Clock>,
    target: String,
    required: Vec<String>,
}

impl TableMirror {
    pub fn new(
        cache: Arc<TableCache>,
        matcher: KeyMatcher,
        audit: Arc<AuditLog>,
        clock: Arc<dyn Clock>,
        target: &str,
        required: Vec<String>,
    ) -> Self {
        Self {
            cache,
            matcher,
            audit,
            clock,
            target: target.to_string(),
            required,
        }
    }

    /// Update the target row for `identity` with the overlapping fields of
    /// `payload`, or insert one if none exists. Only columns the target
    /// already has are written.
    pub fn mirror(
        &self,
        source: &str,
        identity: &Identity,
        payload: &Record,
    ) -> AppResult<MirrorOutcome> {
        ensure_columns(&self.cache, &self.target, &self.required)?;
        let snap = self.cache.get_fresh(&self.target)?;
        require_identity_columns(&snap, &self.matcher)?;

        let store = self.cache.store().as_ref();
        let mut degradations = Vec::new();
        let result = match self.matcher.find(&snap, identity) {
            Some(hit) => {
                degradations.extend(hit.duplicate_degradation(&self.target));
                apply_update(store, &snap, &hit, payload)
            }
            None => apply_insert(store, &snap, payload),
        };
        self.cache.invalidate(&self.target);
        let write = result?;

        info!(
            source,
            target = %self.target,
            identity = %identity,
            action = %write.action,
            row = write.row,
            "mirrored into primary table"
        );

        let entry = AuditEntry {
            timestamp: self.clock.now(),
            action: write.action,
            table_name: self.target.clone(),
            identity_name: identity.name.trim().to_string(),
            identity_phone: identity.phone.trim().to_string(),
            before: write.before,
            after: write.written,
        };
        if let Err(e) = self.audit.append(&entry) {
            warn!(table = %self.target, identity = %identity, error = %e, "audit write failed for mirror");
            degradations.push(Degradation::AuditWriteFailed {
                table: self.target.clone(),
                reason: e.to_string(),
            });
        }

        Ok(MirrorOutcome {
            table: self.target.clone(),
            action: write.action,
            row: write.row,
            degradations,
        })
    }
}
