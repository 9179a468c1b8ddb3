//! SQL behind the sheet primitives. Each row's cells are a JSON array of strings.

use crate::errors::RemoteError;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

type QResult<T> = Result<T, RemoteError>;

pub fn sheet_id(conn: &Connection, name: &str) -> QResult<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM sheets WHERE name = ?1", [name], |r| r.get(0))
        .optional()?)
}

pub fn require_sheet(conn: &Connection, name: &str) -> QResult<i64> {
    sheet_id(conn, name)?.ok_or_else(|| RemoteError::TableMissing(name.to_string()))
}

pub fn list_sheets(conn: &Connection) -> QResult<Vec<String>> {
    let mut stmt = conn.prepare_cached("SELECT name FROM sheets ORDER BY id ASC")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_sheet(conn: &Connection, name: &str) -> QResult<i64> {
    if sheet_id(conn, name)?.is_some() {
        return Err(RemoteError::TableExists(name.to_string()));
    }
    conn.execute(
        "INSERT INTO sheets (name, created_at) VALUES (?1, ?2)",
        params![name, Local::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_rows(conn: &Connection, sheet: i64) -> QResult<Vec<Vec<String>>> {
    let mut stmt = conn.prepare_cached(
        "SELECT cells FROM sheet_rows
         WHERE sheet_id = ?1
         ORDER BY row_num ASC",
    )?;
    let rows = stmt.query_map([sheet], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(serde_json::from_str::<Vec<String>>(&r?)?);
    }
    Ok(out)
}

pub fn load_row(conn: &Connection, sheet: i64, row: usize) -> QResult<Option<Vec<String>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT cells FROM sheet_rows WHERE sheet_id = ?1 AND row_num = ?2",
            params![sheet, row as i64],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn store_row(conn: &Connection, sheet: i64, row: usize, cells: &[String]) -> QResult<()> {
    conn.execute(
        "INSERT INTO sheet_rows (sheet_id, row_num, cells) VALUES (?1, ?2, ?3)
         ON CONFLICT(sheet_id, row_num) DO UPDATE SET cells = excluded.cells",
        params![sheet, row as i64, serde_json::to_string(cells)?],
    )?;
    Ok(())
}

pub fn row_count(conn: &Connection, sheet: i64) -> QResult<usize> {
    let n: i64 = conn.query_row(
        "SELECT IFNULL(MAX(row_num), 0) FROM sheet_rows WHERE sheet_id = ?1",
        [sheet],
        |r| r.get(0),
    )?;
    Ok(n as usize)
}
