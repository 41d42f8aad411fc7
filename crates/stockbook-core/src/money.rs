//! # Money Module
//!
//! Provides the `Money` type for monetary values and `Percent` for margins.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A sale of 3 × 8.00 minus 0.10 fees must come out at exactly 23.90,    │
//! │  and the margin computed from it must be stable across reloads.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents, checked                                   │
//! │    2400 cents - 10 cents = 2390 cents                                  │
//! │    overflow is reported, never wrapped                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::Money;
//!
//! let price = Money::from_cents(800); // 8.00
//! let total = price.checked_mul(3);  // 24.00, None past the cent range
//! assert_eq!(total, Some(Money::from_cents(2400)));
//!
//! // User input is parsed without ever touching a float
//! let parsed: Money = "8.00".parse().unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: a sale can net out negative once fees are deducted
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `self × qty`, or `None` if the result leaves the `i64` cent range.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(500);
    /// assert_eq!(unit_price.checked_mul(3), Some(Money::from_cents(1500)));
    /// assert_eq!(unit_price.checked_mul(i64::MAX / 100), None);
    /// ```
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Plain decimal form without currency sign, e.g. `-5.50`.
    ///
    /// This is the form written to exports and accepted back by `parse`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

/// Shows money as `24.00 €`, the way the sales summary renders it.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} €", self.to_decimal_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Parses a decimal amount such as `8`, `8.5`, `8.00` or `-3.25`.
///
/// At most two fractional digits are accepted; a comma is accepted as the
/// decimal separator.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let normalized = digits.replace(',', ".");
        let (major_str, minor_str) = match normalized.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (normalized.as_str(), ""),
        };

        if major_str.is_empty() && minor_str.is_empty() {
            return Err(invalid("no digits"));
        }
        if !major_str.chars().all(|c| c.is_ascii_digit())
            || !minor_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a decimal number"));
        }
        if minor_str.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }

        let major: i64 = if major_str.is_empty() {
            0
        } else {
            major_str.parse().map_err(|_| invalid("amount too large"))?
        };
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("bad cents"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Percent Type
// =============================================================================

/// A percentage in basis points (1 bp = 0.01%).
///
/// 3750 bps = 37.50%. Stored as an integer so a margin survives a
/// round-trip through the store unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(i64);

impl Percent {
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Percent(bps)
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Plain decimal form without the percent sign, e.g. `37.50`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }

    /// Returns the value as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `part / whole × 100`, rounded half away from zero to the basis point.
    ///
    /// Returns zero when `whole` is not positive. A ratio beyond the `i64`
    /// basis-point range saturates at `i64::MAX` / `i64::MIN`.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::{Money, Percent};
    ///
    /// let margin = Percent::of(Money::from_cents(900), Money::from_cents(2400));
    /// assert_eq!(margin.bps(), 3750); // 37.50%
    ///
    /// let clamped = Percent::of(Money::from_cents(-500), Money::zero());
    /// assert_eq!(clamped, Percent::zero());
    /// ```
    pub fn of(part: Money, whole: Money) -> Self {
        if !whole.is_positive() {
            return Percent::zero();
        }

        // i128 keeps part × 10000 from overflowing
        let numerator = part.cents() as i128 * 10_000;
        let denominator = whole.cents() as i128;
        let half = denominator / 2;
        let rounded = if numerator >= 0 {
            (numerator + half) / denominator
        } else {
            (numerator - half) / denominator
        };

        match i64::try_from(rounded) {
            Ok(bps) => Percent(bps),
            Err(_) if rounded > 0 => Percent(i64::MAX),
            Err(_) => Percent(i64::MIN),
        }
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} %", self.to_decimal_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
