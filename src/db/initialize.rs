use rusqlite::{Connection, Result};

const SCHEMA_VERSION: i32 = 1;

/// Create the sheet storage schema if it does not exist yet.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sheets (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sheet_rows (
            sheet_id INTEGER NOT NULL REFERENCES sheets(id),
            row_num  INTEGER NOT NULL,
            cells    TEXT NOT NULL DEFAULT '[]',
            PRIMARY KEY (sheet_id, row_num)
        );
        "#,
    )?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if version < SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }
    Ok(())
}
