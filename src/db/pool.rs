//! SQLite connection wrapper (one connection, shared behind a mutex).

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub struct DbPool {
    conn: Mutex<Connection>,
}

impl DbPool {
    /// Open `path`, bounding lock waits by `timeout`.
    pub fn new(path: &str, timeout: Duration) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        conn.busy_timeout(timeout)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Helper to execute a closure with a mutable connection reference.
    pub fn with_conn<F, T, E>(&self, func: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Connection) -> std::result::Result<T, E>,
    {
        let mut guard = self.lock();
        func(&mut guard)
    }
}
