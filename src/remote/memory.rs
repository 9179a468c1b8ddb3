//! In-process store with the same row/column semantics as the SQLite
//! backend. Used by library tests and for dry runs.

use super::{RemoteResult, RemoteStore, StoreOp};
use crate::errors::RemoteError;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
struct Inner {
    tables: Vec<(String, Vec<Vec<String>>)>,
}

impl Inner {
    fn rows_mut(&mut self, table: &str) -> RemoteResult<&mut Vec<Vec<String>>> {
        self.tables
            .iter_mut()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| rows)
            .ok_or_else(|| RemoteError::TableMissing(table.to_string()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    failures: Mutex<HashSet<(StoreOp, String)>>,
    fetch_delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with raw rows (row 0 = header).
    pub fn with_table(self, name: &str, rows: Vec<Vec<String>>) -> Self {
        self.lock().tables.push((name.to_string(), rows));
        self
    }

    /// Make every `op` against `table` fail with `Unavailable` until cleared.
    pub fn fail_on(&self, op: StoreOp, table: &str) {
        self.failures_lock().insert((op, table.to_string()));
    }

    pub fn clear_failures(&self) {
        self.failures_lock().clear();
    }

    /// Slow down `get_all_rows`, to widen concurrent-miss windows in tests.
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.fetch_delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    /// Number of `get_all_rows` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Raw copy of a table's rows, header included.
    pub fn dump(&self, table: &str) -> Option<Vec<Vec<String>>> {
        self.lock()
            .tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| rows.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn failures_lock(&self) -> std::sync::MutexGuard<'_, HashSet<(StoreOp, String)>> {
        self.failures.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self, op: StoreOp, table: &str) -> RemoteResult<()> {
        if self.failures_lock().contains(&(op, table.to_string())) {
            return Err(RemoteError::Unavailable(format!(
                "injected failure: {} on '{}'",
                op.as_str(),
                table
            )));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn list_tables(&self) -> RemoteResult<Vec<String>> {
        Ok(self.lock().tables.iter().map(|(n, _)| n.clone()).collect())
    }

    fn create_table(&self, name: &str, header: &[String]) -> RemoteResult<()> {
        self.check(StoreOp::CreateTable, name)?;
        let mut inner = self.lock();
        if inner.tables.iter().any(|(n, _)| n == name) {
            return Err(RemoteError::TableExists(name.to_string()));
        }
        let rows = if header.is_empty() {
            Vec::new()
        } else {
            vec![header.to_vec()]
        };
        inner.tables.push((name.to_string(), rows));
        Ok(())
    }

    fn get_header(&self, table: &str) -> RemoteResult<Vec<String>> {
        self.check(StoreOp::GetHeader, table)?;
        let mut inner = self.lock();
        Ok(inner.rows_mut(table)?.first().cloned().unwrap_or_default())
    }

    fn get_all_rows(&self, table: &str) -> RemoteResult<Vec<Vec<String>>> {
        self.check(StoreOp::GetAllRows, table)?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(d) = delay {
            std::thread::sleep(d);
        }
        let mut inner = self.lock();
        Ok(inner.rows_mut(table)?.clone())
    }

    fn update_cell(&self, table: &str, row: usize, col: usize, value: &str) -> RemoteResult<()> {
        self.check(StoreOp::UpdateCell, table)?;
        if col == 0 {
            return Err(RemoteError::ColumnOutOfRange {
                table: table.to_string(),
                col,
            });
        }
        let mut inner = self.lock();
        let rows = inner.rows_mut(table)?;
        if row == 1 && rows.is_empty() {
            rows.push(Vec::new());
        }
        let target = row
            .checked_sub(1)
            .and_then(|i| rows.get_mut(i))
            .ok_or_else(|| RemoteError::RowOutOfRange {
                table: table.to_string(),
                row,
            })?;
        if target.len() < col {
            target.resize(col, String::new());
        }
        target[col - 1] = value.to_string();
        Ok(())
    }

    fn append_row(&self, table: &str, values: &[String]) -> RemoteResult<()> {
        self.check(StoreOp::AppendRow, table)?;
        let mut inner = self.lock();
        inner.rows_mut(table)?.push(values.to_vec());
        Ok(())
    }

    fn add_column(&self, table: &str, name: &str) -> RemoteResult<()> {
        self.check(StoreOp::AddColumn, table)?;
        let mut inner = self.lock();
        let rows = inner.rows_mut(table)?;
        match rows.first_mut() {
            Some(header) => header.push(name.to_string()),
            None => rows.push(vec![name.to_string()]),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::TableLookup;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn missing_table_is_not_provisioned() {
        let store = MemoryStore::new();
        assert_eq!(store.open_table("CRM").expect("open"), TableLookup::NotProvisioned);
    }

    #[test]
    fn update_cell_pads_short_rows() {
        let store = MemoryStore::new().with_table("T", vec![s(&["A", "B", "C"]), s(&["1"])]);
        store.update_cell("T", 2, 3, "x").expect("update");
        assert_eq!(store.dump("T").expect("table")[1], s(&["1", "", "x"]));
    }

    #[test]
    fn update_past_last_row_fails() {
        let store = MemoryStore::new().with_table("T", vec![s(&["A"])]);
        let err = store.update_cell("T", 5, 1, "x").unwrap_err();
        assert!(matches!(err, RemoteError::RowOutOfRange { row: 5, .. }));
    }

    #[test]
    fn injected_failures_are_per_table() {
        let store = MemoryStore::new()
            .with_table("A", vec![s(&["h"])])
            .with_table("B", vec![s(&["h"])]);
        store.fail_on(StoreOp::AppendRow, "A");
        assert!(store.append_row("A", &s(&["x"])).is_err());
        assert!(store.append_row("B", &s(&["x"])).is_ok());
        store.clear_failures();
        assert!(store.append_row("A", &s(&["x"])).is_ok());
    }
}
