//! # Validation Module
//!
//! Field-level input checks run before any ledger rule.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Type checks (integers, dates, enum values)                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Blank / oversized text, negative amounts                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: StockLedger                                                  │
//! │  ├── Duplicate SKU / kit name, unknown references                      │
//! │  └── Quantities and stock availability                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{validate_sku, validate_amount};
//! use stockbook_core::Money;
//!
//! assert!(validate_sku("A1").is_ok());
//! assert!(validate_amount("shipping fees", Money::from_cents(-1)).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_NAME_LEN, MAX_SKU_LEN, MAX_TEXT_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_sku;
///
/// assert!(validate_sku("SAVON-LAV-100").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required display name (product name, kit name).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field (buyer, comment, order number).
///
/// Empty is fine; only the length is bounded.
pub fn validate_text(field: &str, text: &str) -> ValidationResult<()> {
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a non-negative monetary amount (prices, fees).
///
/// Zero is allowed: free items and fee-less sales are both real.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates that a date range is not inverted.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvalidFormat {
            field: "date range".to_string(),
            reason: format!("start {} is after end {}", start, end),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("A1").is_ok());
        assert!(validate_sku("SAVON-LAV-100").is_ok());
        assert!(validate_sku("bougie_01").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Savon lavande").is_ok());
        assert!(validate_name("name", "Coffret Découverte").is_ok());
        assert_eq!(
            validate_name("kit name", " "),
            Err(ValidationError::Required {
                field: "kit name".to_string()
            })
        );
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_text("comment", "").is_ok());
        assert!(validate_text("comment", "gift wrap please").is_ok());
        assert!(validate_text("comment", &"x".repeat(MAX_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("price", Money::zero()).is_ok());
        assert!(validate_amount("price", Money::from_cents(1099)).is_ok());
        assert!(validate_amount("price", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dec = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(validate_date_range(jan, dec).is_ok());
        assert!(validate_date_range(jan, jan).is_ok());
        assert!(validate_date_range(dec, jan).is_err());
    }
}
