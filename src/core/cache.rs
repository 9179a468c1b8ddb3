//! Time-boxed per-table snapshot cache.
//!
//! Each table has its own slot guarded by a mutex that is held across the
//! remote fetch, so concurrent misses on one table coalesce into a single
//! `get_all_rows` call and an invalidation never races a fetch in flight.

use crate::errors::{AppError, AppResult, RemoteError};
use crate::models::record::TableSnapshot;
use crate::remote::{RemoteStore, TableLookup};
use crate::utils::clock::Clock;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

type Slot = Arc<Mutex<Option<Arc<TableSnapshot>>>>;

pub struct TableCache {
    store: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    canonical_headers: HashMap<String, Vec<String>>,
    slots: Mutex<HashMap<String, Slot>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl TableCache {
    pub fn new(store: Arc<dyn RemoteStore>, clock: Arc<dyn Clock>, ttl_secs: u64) -> Self {
        Self {
            store,
            clock,
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            canonical_headers: HashMap::new(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Header written when `table` has to be created on first access.
    /// Only tables registered here are ever created.
    pub fn with_canonical_header(mut self, table: &str, header: Vec<String>) -> Self {
        self.canonical_headers.insert(table.to_string(), header);
        self
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    fn slot(&self, table: &str) -> Slot {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(table.to_string()).or_default())
    }

    fn is_fresh(&self, snap: &TableSnapshot) -> bool {
        self.clock.now() - snap.fetched_at < self.ttl
    }

    /// Cached snapshot if still fresh, otherwise a new one from the store.
    pub fn get(&self, table: &str) -> AppResult<Arc<TableSnapshot>> {
        let slot = self.slot(table);
        let mut guard = lock(&slot);

        if let Some(snap) = guard.as_ref()
            && self.is_fresh(snap)
        {
            debug!(table, "cache hit");
            return Ok(Arc::clone(snap));
        }

        debug!(table, "cache miss; fetching");
        let snap = Arc::new(self.fetch(table)?);
        *guard = Some(Arc::clone(&snap));
        Ok(snap)
    }

    /// Drop the cached copy and fetch again; the path every writer uses.
    pub fn get_fresh(&self, table: &str) -> AppResult<Arc<TableSnapshot>> {
        self.invalidate(table);
        self.get(table)
    }

    pub fn invalidate(&self, table: &str) {
        let slot = self.slot(table);
        *lock(&slot) = None;
        debug!(table, "cache invalidated");
    }

    pub fn invalidate_all(&self) {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        for slot in slots {
            *lock(&slot) = None;
        }
        debug!("cache invalidated (all tables)");
    }

    fn fetch(&self, table: &str) -> AppResult<TableSnapshot> {
        let lookup = self
            .store
            .open_table(table)
            .map_err(|e| AppError::remote(table, "open table", e))?;

        match lookup {
            TableLookup::Found(values) => {
                Ok(TableSnapshot::from_values(table, values, self.clock.now()))
            }
            TableLookup::NotProvisioned => self.provision(table),
        }
    }

    fn provision(&self, table: &str) -> AppResult<TableSnapshot> {
        let Some(header) = self.canonical_headers.get(table).cloned() else {
            warn!(table, "table not found and has no known layout");
            return Err(AppError::remote(
                table,
                "open table",
                RemoteError::TableMissing(table.to_string()),
            ));
        };
        info!(table, columns = header.len(), "provisioning missing table");

        match self.store.create_table(table, &header) {
            Ok(()) => Ok(TableSnapshot::empty(table, header, self.clock.now())),
            // Someone else created it between our lookup and create.
            Err(RemoteError::TableExists(_)) => {
                let values = self
                    .store
                    .get_all_rows(table)
                    .map_err(|e| AppError::remote(table, "get all rows", e))?;
                Ok(TableSnapshot::from_values(table, values, self.clock.now()))
            }
            Err(e) => Err(AppError::remote(table, "create table", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryStore, StoreOp};
    use crate::utils::clock::FixedClock;
    use chrono::Local;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|x| x.to_string()).collect()
    }

    fn setup() -> (Arc<MemoryStore>, Arc<FixedClock>, TableCache) {
        let store = Arc::new(MemoryStore::new().with_table("CRM", vec![s(&["A"]), s(&["1"])]));
        let clock = Arc::new(FixedClock::new(Local::now()));
        let cache = TableCache::new(store.clone(), clock.clone(), 60);
        (store, clock, cache)
    }

    #[test]
    fn reuses_snapshot_within_window_and_refetches_after() {
        let (store, clock, cache) = setup();
        cache.get("CRM").expect("get");
        cache.get("CRM").expect("get");
        assert_eq!(store.fetch_count(), 1);

        clock.advance(Duration::seconds(61));
        cache.get("CRM").expect("get");
        assert_eq!(store.fetch_count(), 2);
    }

    #[test]
    fn invalidation_forces_refetch() {
        let (store, _clock, cache) = setup();
        cache.get("CRM").expect("get");
        store.append_row("CRM", &s(&["2"])).expect("append");
        assert_eq!(cache.get("CRM").expect("get").len(), 1);

        cache.invalidate("CRM");
        assert_eq!(cache.get("CRM").expect("get").len(), 2);

        store.append_row("CRM", &s(&["3"])).expect("append");
        cache.invalidate_all();
        assert_eq!(cache.get("CRM").expect("get").len(), 3);
    }

    #[test]
    fn missing_table_is_created_with_canonical_header() {
        let (store, _clock, cache) = setup();
        let cache = cache.with_canonical_header("Users", s(&["username", "role"]));
        let snap = cache.get("Users").expect("get");
        assert!(snap.is_empty());
        assert_eq!(snap.header, s(&["username", "role"]));
        assert_eq!(store.dump("Users").expect("created"), vec![s(&["username", "role"])]);
    }

    #[test]
    fn unknown_missing_table_is_not_created() {
        let (store, _clock, cache) = setup();
        let err = cache.get("Delivry").unwrap_err();
        assert!(matches!(
            err,
            AppError::RemoteStore { source: RemoteError::TableMissing(ref t), .. } if t == "Delivry"
        ));
        assert!(store.dump("Delivry").is_none());
    }

    #[test]
    fn oversized_ttl_never_expires() {
        let store = Arc::new(MemoryStore::new().with_table("CRM", vec![s(&["A"])]));
        let clock = Arc::new(FixedClock::new(Local::now()));
        let cache = TableCache::new(store.clone(), clock.clone(), u64::MAX);
        cache.get("CRM").expect("get");
        clock.advance(Duration::days(365 * 100));
        cache.get("CRM").expect("get");
        assert_eq!(store.fetch_count(), 1);

        let huge = TableCache::new(store, clock, 10_000_000_000_000_000);
        huge.get("CRM").expect("get");
    }

    #[test]
    fn provisioning_does_not_mask_store_failures() {
        let (store, _clock, cache) = setup();
        let cache = cache.with_canonical_header("Users", s(&["username"]));
        store.fail_on(StoreOp::CreateTable, "Users");
        let err = cache.get("Users").unwrap_err();
        assert!(matches!(err, AppError::RemoteStore { .. }));
        store.fail_on(StoreOp::GetAllRows, "CRM");
        assert!(cache.get("CRM").is_err());
    }

    #[test]
    fn concurrent_misses_coalesce() {
        let (store, _clock, cache) = setup();
        store.set_fetch_delay(Some(std::time::Duration::from_millis(50)));
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get("CRM").map(|s| s.len()))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().expect("thread").expect("get"), 1);
        }
        assert_eq!(store.fetch_count(), 1);
    }
}
