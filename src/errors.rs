//! Unified application error type.
//! Every layer (remote, core, cli, export) returns AppError so that the
//! caller sees one consistent failure surface.

use std::io;
use thiserror::Error;

/// Failure talking to the backing tabular store.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("row encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("table '{0}' does not exist")]
    TableMissing(String),

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("row {row} is out of range for table '{table}'")]
    RowOutOfRange { table: String, row: usize },

    #[error("column {col} is out of range for table '{table}'")]
    ColumnOutOfRange { table: String, col: usize },

    /// Transport, rate-limit or timeout failure reported by the store.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Remote store
    // ---------------------------
    #[error("Remote store error on '{table}' ({context}): {source}")]
    RemoteStore {
        table: String,
        context: String,
        #[source]
        source: RemoteError,
    },

    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    // ---------------------------
    // Schema / validation
    // ---------------------------
    #[error("Schema error: table '{table}' has no column '{column}'")]
    Schema { table: String, column: String },

    #[error("Validation error: {0}")]
    Validation(String),

    // ---------------------------
    // Users / auth
    // ---------------------------
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Access denied: {0}")]
    Unauthorized(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Serialization / export
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Wrap a store failure with the table and operation it happened on.
    pub fn remote(table: &str, context: impl Into<String>, source: RemoteError) -> Self {
        AppError::RemoteStore {
            table: table.to_string(),
            context: context.into(),
            source,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
