//! Boundary to the remote tabular store.
//!
//! Rows and columns are 1-based; row 1 is the header. Every call is a
//! blocking round trip from the caller's point of view, and each backend
//! bounds it with its own timeout.

pub mod memory;

use crate::errors::RemoteError;

pub use memory::MemoryStore;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Result of opening a table: its raw contents, or the fact that it has
/// never been created.
#[derive(Debug, Clone, PartialEq)]
pub enum TableLookup {
    /// Raw rows, row 0 being the header (possibly empty).
    Found(Vec<Vec<String>>),
    NotProvisioned,
}

/// Which primitive an operation used; handy for logs and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListTables,
    CreateTable,
    GetHeader,
    GetAllRows,
    UpdateCell,
    AppendRow,
    AddColumn,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::ListTables => "list_tables",
            StoreOp::CreateTable => "create_table",
            StoreOp::GetHeader => "get_header",
            StoreOp::GetAllRows => "get_all_rows",
            StoreOp::UpdateCell => "update_cell",
            StoreOp::AppendRow => "append_row",
            StoreOp::AddColumn => "add_column",
        }
    }
}

pub trait RemoteStore: Send + Sync {
    fn list_tables(&self) -> RemoteResult<Vec<String>>;

    fn create_table(&self, name: &str, header: &[String]) -> RemoteResult<()>;

    fn get_header(&self, table: &str) -> RemoteResult<Vec<String>>;

    /// All rows, row 0 being the header.
    fn get_all_rows(&self, table: &str) -> RemoteResult<Vec<Vec<String>>>;

    fn update_cell(&self, table: &str, row: usize, col: usize, value: &str) -> RemoteResult<()>;

    fn append_row(&self, table: &str, values: &[String]) -> RemoteResult<()>;

    fn add_column(&self, table: &str, name: &str) -> RemoteResult<()>;

    /// Fetch a table, reporting absence as `NotProvisioned` rather than an error.
    fn open_table(&self, table: &str) -> RemoteResult<TableLookup> {
        if !self.list_tables()?.iter().any(|t| t == table) {
            return Ok(TableLookup::NotProvisioned);
        }
        Ok(TableLookup::Found(self.get_all_rows(table)?))
    }
}
