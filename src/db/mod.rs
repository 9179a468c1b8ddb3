//! SQLite-backed remote store.

pub mod initialize;
pub mod pool;
pub mod queries;

use crate::errors::RemoteError;
use crate::remote::{RemoteResult, RemoteStore};
use pool::DbPool;
use std::time::Duration;
use tracing::debug;

pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn open(path: &str, timeout: Duration) -> RemoteResult<Self> {
        let pool = DbPool::new(path, timeout)?;
        pool.with_conn(|conn| initialize::init_db(conn))?;
        debug!(path, "sqlite store opened");
        Ok(Self { pool })
    }

    pub fn in_memory() -> RemoteResult<Self> {
        let pool = DbPool::in_memory()?;
        pool.with_conn(|conn| initialize::init_db(conn))?;
        Ok(Self { pool })
    }

    fn run<T>(
        &self,
        f: impl FnOnce(&mut rusqlite::Connection) -> Result<T, RemoteError>,
    ) -> RemoteResult<T> {
        self.pool.with_conn(f)
    }
}

impl RemoteStore for SqliteStore {
    fn list_tables(&self) -> RemoteResult<Vec<String>> {
        self.run(|conn| queries::list_sheets(conn))
    }

    fn create_table(&self, name: &str, header: &[String]) -> RemoteResult<()> {
        self.run(|conn| {
            let tx = conn.transaction()?;
            let id = queries::insert_sheet(&tx, name)?;
            if !header.is_empty() {
                queries::store_row(&tx, id, 1, header)?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn get_header(&self, table: &str) -> RemoteResult<Vec<String>> {
        self.run(|conn| {
            let id = queries::require_sheet(conn, table)?;
            Ok(queries::load_row(conn, id, 1)?.unwrap_or_default())
        })
    }

    fn get_all_rows(&self, table: &str) -> RemoteResult<Vec<Vec<String>>> {
        self.run(|conn| {
            let id = queries::require_sheet(conn, table)?;
            queries::load_rows(conn, id)
        })
    }

    fn update_cell(&self, table: &str, row: usize, col: usize, value: &str) -> RemoteResult<()> {
        if col == 0 {
            return Err(RemoteError::ColumnOutOfRange {
                table: table.to_string(),
                col,
            });
        }
        self.run(|conn| {
            let tx = conn.transaction()?;
            let id = queries::require_sheet(&tx, table)?;
            let mut cells = match queries::load_row(&tx, id, row)? {
                Some(cells) => cells,
                None if row == 1 => Vec::new(),
                None => {
                    return Err(RemoteError::RowOutOfRange {
                        table: table.to_string(),
                        row,
                    });
                }
            };
            if cells.len() < col {
                cells.resize(col, String::new());
            }
            cells[col - 1] = value.to_string();
            queries::store_row(&tx, id, row, &cells)?;
            tx.commit()?;
            Ok(())
        })
    }

    fn append_row(&self, table: &str, values: &[String]) -> RemoteResult<()> {
        self.run(|conn| {
            let tx = conn.transaction()?;
            let id = queries::require_sheet(&tx, table)?;
            let next = queries::row_count(&tx, id)? + 1;
            queries::store_row(&tx, id, next, values)?;
            tx.commit()?;
            Ok(())
        })
    }

    fn add_column(&self, table: &str, name: &str) -> RemoteResult<()> {
        self.run(|conn| {
            let tx = conn.transaction()?;
            let id = queries::require_sheet(&tx, table)?;
            let mut header = queries::load_row(&tx, id, 1)?.unwrap_or_default();
            header.push(name.to_string());
            queries::store_row(&tx, id, 1, &header)?;
            tx.commit()?;
            Ok(())
        })
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
    fn rows_persist_in_order() {
        let store = SqliteStore::in_memory().expect("open");
        store.create_table("CRM", &s(&["Customer Name", "Contact Number"])).expect("create");
        store.append_row("CRM", &s(&["John Doe", "9876543210"])).expect("append");
        store.append_row("CRM", &s(&["Jane Roe", "9123456780"])).expect("append");

        let rows = store.get_all_rows("CRM").expect("rows");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0], "Jane Roe");
    }

    #[test]
    fn update_and_add_column() {
        let store = SqliteStore::in_memory().expect("open");
        store.create_table("CRM", &s(&["A"])).expect("create");
        store.append_row("CRM", &s(&["1"])).expect("append");
        store.add_column("CRM", "SALE VALUE").expect("add column");
        store.update_cell("CRM", 2, 2, "1500").expect("update");

        assert_eq!(store.get_header("CRM").expect("header"), s(&["A", "SALE VALUE"]));
        assert_eq!(store.get_all_rows("CRM").expect("rows")[1], s(&["1", "1500"]));
        assert!(matches!(
            store.update_cell("CRM", 9, 1, "x"),
            Err(RemoteError::RowOutOfRange { .. })
        ));
    }

    #[test]
    fn duplicate_create_and_missing_table() {
        let store = SqliteStore::in_memory().expect("open");
        store.create_table("Users", &[]).expect("create");
        assert!(matches!(
            store.create_table("Users", &[]),
            Err(RemoteError::TableExists(_))
        ));
        assert_eq!(store.open_table("Nope").expect("open"), TableLookup::NotProvisioned);
        assert_eq!(
            store.open_table("Users").expect("open"),
            TableLookup::Found(Vec::new())
        );
    }
}
