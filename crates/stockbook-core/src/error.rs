//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── LedgerError      - Catalog and stock rule violations              │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  stockbook-store errors (separate crate)                               │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  Flow: ValidationError → LedgerError → StoreError → CLI message        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `LedgerError` is a user-correctable input error. The sales journal
//! hands them back exactly as the ledger raised them, so a rejected kit sale
//! still lists every short component.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Shortage
// =============================================================================

/// One product that cannot cover its share of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortage {
    pub sku: String,
    pub available: i64,
    pub required: i64,
}

impl Shortage {
    pub fn new(sku: impl Into<String>, available: i64, required: i64) -> Self {
        Shortage {
            sku: sku.into(),
            available,
            required,
        }
    }
}

impl fmt::Display for Shortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (available {}, required {})",
            self.sku, self.available, self.required
        )
    }
}

/// Newtype so the shortage list renders as one comma-separated message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shortages(pub Vec<Shortage>);

impl Shortages {
    pub fn as_slice(&self) -> &[Shortage] {
        &self.0
    }
}

impl fmt::Display for Shortages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, shortage) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", shortage)?;
        }
        Ok(())
    }
}

// =============================================================================
// Ledger Error
// =============================================================================

/// Catalog and stock rule violations.
///
/// ## User Workflow
/// ```text
/// Record sale: 1 × K1
///      │
///      ▼
/// check_and_reserve: K1 = {A1: 2, A2: 3}
///      │
///      ▼
/// InsufficientStock([A2 (available 2, required 3)])
///      │
///      ▼
/// CLI shows: "Insufficient stock for: A2 (available 2, required 3)"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A product with this SKU is already registered.
    #[error("A product with SKU '{0}' already exists")]
    DuplicateSku(String),

    /// A kit with this name is already composed.
    #[error("A kit named '{0}' already exists")]
    DuplicateKitName(String),

    /// A quantity is out of range (negative stock, non-positive component
    /// or sale quantity).
    #[error("Invalid quantity for {field}: {value}")]
    InvalidQuantity { field: String, value: i64 },

    /// A kit was submitted without components.
    #[error("A kit must contain at least one product")]
    EmptyKit,

    /// No product with this SKU exists.
    #[error("Unknown product SKU: {0}")]
    UnknownSku(String),

    /// No kit with this name exists.
    #[error("Unknown kit: {0}")]
    UnknownKit(String),

    /// One or more products cannot cover the sale. Lists every shortfall.
    #[error("Insufficient stock for: {0}")]
    InsufficientStock(Shortages),

    /// A money total does not fit in the cent range.
    #[error("Amount out of range: {0}")]
    AmountOverflow(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl LedgerError {
    pub fn invalid_quantity(field: impl Into<String>, value: i64) -> Self {
        LedgerError::InvalidQuantity {
            field: field.into(),
            value,
        }
    }

    pub fn overflow(what: impl Into<String>) -> Self {
        LedgerError::AmountOverflow(what.into())
    }

    /// Returns the shortages when this is an `InsufficientStock` error.
    pub fn shortages(&self) -> Option<&[Shortage]> {
        match self {
            LedgerError::InsufficientStock(shortages) => Some(shortages.as_slice()),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any ledger rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. a malformed amount or date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_lists_every_shortage() {
        let err = LedgerError::InsufficientStock(Shortages(vec![
            Shortage::new("A1", 1, 4),
            Shortage::new("A2", 2, 3),
        ]));
        assert_eq!(
            err.to_string(),
            "Insufficient stock for: A1 (available 1, required 4), A2 (available 2, required 3)"
        );
        assert_eq!(err.shortages().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LedgerError::DuplicateSku("A1".to_string()).to_string(),
            "A product with SKU 'A1' already exists"
        );
        assert_eq!(
            LedgerError::invalid_quantity("initial quantity", -1).to_string(),
            "Invalid quantity for initial quantity: -1"
        );
        assert_eq!(
            LedgerError::overflow("total cost").to_string(),
            "Amount out of range: total cost"
        );
        assert_eq!(
            ValidationError::Required {
                field: "sku".to_string()
            }
            .to_string(),
            "sku is required"
        );
    }

    #[test]
    fn test_validation_converts_to_ledger_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let ledger_err: LedgerError = validation_err.into();
        assert!(matches!(ledger_err, LedgerError::Validation(_)));
        assert!(ledger_err.shortages().is_none());
    }
}
