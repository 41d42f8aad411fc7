//! # Store Error Types
//!
//! Error types for persistence operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          Domain Error (LedgerError)        │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  StoreError (this module) ◄─────────────────┘  passed through as-is    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CliError (apps/cli) ← Rendered as a one-line message                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockbook_core::LedgerError;
use thiserror::Error;

/// SQLite primary result codes that mean the file itself is unusable.
const SQLITE_CORRUPT: &str = "11";
const SQLITE_NOTADB: &str = "26";

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file exists but is not a readable SQLite database.
    ///
    /// ## When This Occurs
    /// - File truncated or overwritten by another program
    /// - File is something else entirely
    #[error("Store file is corrupt: {0}")]
    Corrupt(String),

    /// Unique constraint violation while saving a table.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Store could not be opened.
    ///
    /// ## When This Occurs
    /// - Directory doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A persisted row does not describe a valid record.
    ///
    /// ## When This Occurs
    /// - Hand-edited rows with duplicate SKUs or negative stock
    /// - A kit row pointing at a product that no longer exists
    /// - A sale without stored metrics whose recomputed totals overflow
    #[error("Invalid {table} row: {source}")]
    InvalidRow {
        table: &'static str,
        #[source]
        source: LedgerError,
    },

    /// A ledger rule rejected the operation. Passed through unchanged.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn invalid_row(table: &'static str, source: LedgerError) -> Self {
        StoreError::InvalidRow { table, source }
    }

    /// The ledger error behind this failure, if any.
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            StoreError::Ledger(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt(_))
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (NOTADB / CORRUPT) → StoreError::Corrupt
/// sqlx::Error::Database (UNIQUE)           → StoreError::UniqueViolation
/// sqlx::Error::Database (other)            → StoreError::QueryFailed
/// sqlx::Error::PoolTimedOut                → StoreError::PoolExhausted
/// Other                                    → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code();
                let code = code.as_deref();

                if matches!(code, Some(SQLITE_NOTADB) | Some(SQLITE_CORRUPT))
                    || msg.contains("file is not a database")
                    || msg.contains("malformed")
                {
                    StoreError::Corrupt(msg.to_string())
                } else if msg.contains("UNIQUE constraint failed") {
                    // "UNIQUE constraint failed: <table>.<column>"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::duplicate(field, "unknown")
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(io) => StoreError::ConnectionFailed(io.to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

/// Migration errors keep the corrupt-file classification of the
/// statement that failed.
impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        match err {
            sqlx::migrate::MigrateError::Execute(inner) => match StoreError::from(inner) {
                StoreError::Corrupt(msg) => StoreError::Corrupt(msg),
                other => StoreError::MigrationFailed(other.to_string()),
            },
            other => StoreError::MigrationFailed(other.to_string()),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
