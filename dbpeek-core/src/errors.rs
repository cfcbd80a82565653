use thiserror::Error;

use crate::models::connection::Dialect;

/// Custom error type for database operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// Error that occurs during database interactions (e.g., SQL query failure).
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    /// Connection error (e.g., bad credentials, unreachable host, malformed URL).
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Connection error: no driver available for dialect '{0}'")]
    UnsupportedDialect(Dialect),
    /// Schema introspection failed.
    #[error("Reflection error: {0}")]
    Reflection(String),
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Export error: {0}")]
    Export(String),
}
