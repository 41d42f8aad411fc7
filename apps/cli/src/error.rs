//! # CLI Error Type
//!
//! Unified error type for command handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command handler                                                        │
//! │  Result<(), CliError>                                                   │
//! │       │                                                                 │
//! │       ├── LedgerError (duplicate, shortage, ...) ──► CliError::Ledger   │
//! │       ├── StoreError  (SQLite, export)           ──► CliError::Store    │
//! │       └── bad flag combination                   ──► CliError::Usage    │
//! │                                                                         │
//! │  main(): eprintln!("error: {}", err.message()); exit(err.code())        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::process::ExitCode;

use stockbook_core::{LedgerError, ValidationError};
use stockbook_store::StoreError;
use thiserror::Error;

/// Category of a failure, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Input rejected by a field check (exit 1)
    ValidationError,

    /// Duplicate SKU or kit name (exit 1)
    Conflict,

    /// Unknown SKU or kit (exit 1)
    NotFound,

    /// Not enough stock for the sale (exit 1)
    InsufficientStock,

    /// Bad arguments (exit 2, like clap)
    Usage,

    /// Store could not be read or written (exit 3)
    StoreError,
}

impl ErrorCode {
    pub fn exit_code(self) -> ExitCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::Conflict
            | ErrorCode::NotFound
            | ErrorCode::InsufficientStock => ExitCode::from(1),
            ErrorCode::Usage => ExitCode::from(2),
            ErrorCode::StoreError => ExitCode::from(3),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::Usage => "USAGE",
            ErrorCode::StoreError => "STORE_ERROR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(StoreError),

    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ledger failures surfaced through the store stay ledger failures.
impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Ledger(ledger) => CliError::Ledger(ledger),
            other => CliError::Store(other),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Ledger(LedgerError::Validation(err))
    }
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CliError::Ledger(err) => match err {
                LedgerError::DuplicateSku(_) | LedgerError::DuplicateKitName(_) => ErrorCode::Conflict,
                LedgerError::UnknownSku(_) | LedgerError::UnknownKit(_) => ErrorCode::NotFound,
                LedgerError::InsufficientStock(_) => ErrorCode::InsufficientStock,
                LedgerError::InvalidQuantity { .. }
                | LedgerError::EmptyKit
                | LedgerError::AmountOverflow(_)
                | LedgerError::Validation(_) => ErrorCode::ValidationError,
            },
            CliError::Usage(_) => ErrorCode::Usage,
            CliError::Store(_) | CliError::Io(_) | CliError::Json(_) => ErrorCode::StoreError,
        }
    }

    /// One line for the terminal.
    pub fn message(&self) -> String {
        match self {
            CliError::Ledger(LedgerError::DuplicateSku(sku)) => {
                format!("a product with SKU '{}' already exists", sku)
            }
            CliError::Ledger(LedgerError::DuplicateKitName(name)) => {
                format!("a kit named '{}' already exists", name)
            }
            CliError::Ledger(LedgerError::UnknownSku(sku)) => format!("no product with SKU '{}'", sku),
            CliError::Ledger(LedgerError::UnknownKit(name)) => format!("no kit named '{}'", name),
            CliError::Ledger(LedgerError::EmptyKit) => "a kit needs at least one component".to_string(),
            CliError::Ledger(LedgerError::InsufficientStock(shortages)) => {
                let lines: Vec<String> = shortages
                    .as_slice()
                    .iter()
                    .map(|s| format!("{} ({} left, {} needed)", s.sku, s.available, s.required))
                    .collect();
                format!("not enough stock for: {}", lines.join(", "))
            }
            CliError::Store(err) => {
                tracing::error!(error = ?err, "Store failure");
                err.to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.code().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::{Shortage, Shortages};

    #[test]
    fn test_store_wrapped_ledger_error_is_unwrapped() {
        let err = CliError::from(StoreError::Ledger(LedgerError::UnknownKit("K9".into())));
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "no kit named 'K9'");
    }

    #[test]
    fn test_shortage_message_lists_every_component() {
        let err = CliError::Ledger(LedgerError::InsufficientStock(Shortages(vec![
            Shortage::new("A1", 1, 2),
            Shortage::new("A2", 0, 3),
        ])));
        assert_eq!(err.code(), ErrorCode::InsufficientStock);
        assert_eq!(
            err.message(),
            "not enough stock for: A1 (1 left, 2 needed), A2 (0 left, 3 needed)"
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(CliError::usage("x").code(), ErrorCode::Usage);
        assert_eq!(
            CliError::Ledger(LedgerError::invalid_quantity("quantity", 0)).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(
            CliError::Ledger(LedgerError::overflow("total sale price")).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(ErrorCode::Conflict.to_string(), "CONFLICT");
    }
}
