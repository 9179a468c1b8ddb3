//! The one object callers hold: wires the cache, normalizer, audit log,
//! upsert engine and user store around a single remote store.

use super::audit::AuditLog;
use super::auth::AuthGate;
use super::cache::TableCache;
use super::columns::ensure_columns;
use super::normalize::FieldNormalizer;
use super::upsert::{UpsertEngine, UpsertOutcome};
use super::users::{UserChange, UserStore};
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::audit::{AUDIT_HEADER, AuditEntry};
use crate::models::user::USERS_HEADER;
use crate::models::{FieldValue, Identity, Record, Role, TableSnapshot, UserRecord};
use crate::remote::RemoteStore;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::text::{digits_only, normalize_name};
use std::sync::Arc;
use tracing::info;

/// Minimum digits before a search query is also tried against phone numbers.
const MIN_PHONE_QUERY_DIGITS: usize = 3;

pub struct RecordStore {
    cfg: Config,
    cache: Arc<TableCache>,
    audit: Arc<AuditLog>,
    users: Arc<UserStore>,
    engine: UpsertEngine,
}

impl RecordStore {
    pub fn new(store: Arc<dyn RemoteStore>, cfg: &Config) -> Self {
        Self::with_clock(store, cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn RemoteStore>, cfg: &Config, clock: Arc<dyn Clock>) -> Self {
        let mut cache = TableCache::new(store, Arc::clone(&clock), cfg.cache_ttl_secs)
            .with_canonical_header(&cfg.audit_table, AUDIT_HEADER.iter().map(|h| h.to_string()).collect())
            .with_canonical_header(&cfg.users_table, USERS_HEADER.iter().map(|h| h.to_string()).collect());
        for (table, header) in &cfg.tables {
            cache = cache.with_canonical_header(table, header.clone());
        }
        let cache = Arc::new(cache);

        let audit = Arc::new(AuditLog::new(Arc::clone(&cache), cfg.audit_table.clone()));
        let users = Arc::new(UserStore::new(Arc::clone(&cache), cfg.users_table.clone()));
        let engine = UpsertEngine::new(
            Arc::clone(&cache),
            Arc::new(FieldNormalizer::from_config(cfg)),
            Arc::clone(&audit),
            clock,
            &cfg.primary_table,
            cfg.required_columns.clone(),
        )
        .protect_table(&cfg.users_table);

        Self {
            cfg: cfg.clone(),
            cache,
            audit,
            users,
            engine,
        }
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    /// Create every known table that is missing and bring headers up to
    /// date. Returns the tables checked.
    pub fn provision(&self) -> AppResult<Vec<String>> {
        let mut tables = vec![self.cfg.audit_table.clone(), self.cfg.users_table.clone()];
        tables.extend(self.cfg.tables.keys().cloned());

        for table in &tables {
            self.cache.get(table)?;
            if let Some(required) = self.cfg.required_columns.get(table) {
                ensure_columns(&self.cache, table, required)?;
            }
        }
        self.users.ensure_header()?;
        self.cache.invalidate_all();
        info!(count = tables.len(), "tables provisioned");
        Ok(tables)
    }

    pub fn upsert(
        &self,
        table: &str,
        identity: &Identity,
        fields: &Record<FieldValue>,
        mirror: bool,
    ) -> AppResult<UpsertOutcome> {
        self.engine.upsert(table, identity, fields, mirror)
    }

    pub fn read_table(&self, table: &str) -> AppResult<Arc<TableSnapshot>> {
        self.cache.get(table)
    }

    /// Rows whose name contains the query, or whose phone digits contain
    /// the query's digits when it has enough of them.
    pub fn search(&self, table: &str, query: &str) -> AppResult<Vec<Record>> {
        let snap = self.cache.get(table)?;
        let matcher = self.engine.matcher();
        let name_q = normalize_name(query);
        let digits_q = digits_only(query);
        let by_phone = digits_q.len() >= MIN_PHONE_QUERY_DIGITS;

        Ok((0..snap.len())
            .filter(|&i| {
                let name_hit = !name_q.is_empty()
                    && normalize_name(snap.cell(i, matcher.name_field())).contains(&name_q);
                let phone_hit =
                    by_phone && digits_only(snap.cell(i, matcher.phone_field())).contains(&digits_q);
                name_hit || phone_hit
            })
            .filter_map(|i| snap.record(i))
            .collect())
    }

    /// Audit entries, newest first.
    pub fn history(&self, limit: Option<usize>) -> AppResult<Vec<AuditEntry>> {
        let mut entries = self.audit.entries()?;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    pub fn get_users(&self) -> AppResult<Vec<UserRecord>> {
        self.users.get_all()
    }

    pub fn upsert_user(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
        active: bool,
    ) -> AppResult<UserChange> {
        self.users
            .upsert_user(username, password_hash, full_name, role, active)
    }

    pub fn deactivate_user(&self, username: &str) -> AppResult<()> {
        self.users.deactivate(username)
    }

    pub fn auth_gate(&self) -> AuthGate {
        AuthGate::new(Arc::clone(&self.users))
    }
}
