//! # Database Error Types
//!
//! Error types for favorites store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds categorization                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LocalError (repository boundary) ← DISK_FULL or UNKNOWN               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UiText                                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bookpedia_core::LocalError;
use thiserror::Error;

/// SQLite primary result code for "database or disk is full".
const SQLITE_FULL: &str = "13";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The storage medium has no room left.
    ///
    /// ## When This Occurs
    /// - Disk is full
    /// - `max_page_count` reached
    #[error("Database or disk is full")]
    DiskFull,

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A JSON list column could not be encoded or decoded.
    #[error("Invalid list column: {0}")]
    Serialization(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Returns true if the failure was caused by lack of space.
    pub fn is_disk_full(&self) -> bool {
        matches!(self, DbError::DiskFull)
    }

    /// Collapses this error into the closed local taxonomy.
    pub fn to_local(&self) -> LocalError {
        if self.is_disk_full() {
            LocalError::DiskFull
        } else {
            LocalError::Unknown
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (SQLITE_FULL) → DbError::DiskFull
/// sqlx::Error::Database (other)       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut           → DbError::PoolExhausted
/// Other                               → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let is_full = db_err.code().as_deref() == Some(SQLITE_FULL)
                    || db_err.message().contains("database or disk is full");
                if is_full {
                    DbError::DiskFull
                } else {
                    DbError::QueryFailed(db_err.message().to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
