//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! Catalog, stock ledger and sales journal for a small shop that sells
//! single products and kits across several marketplaces.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    CLI (apps/cli)                               │   │
//! │  │    product add ──► kit add ──► sale record ──► sale export      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockbook-store (Session)                    │   │
//! │  │          load at start, flush touched tables after writes       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockbook-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │  ledger   │  │  journal  │  │   money   │  │   │
//! │  │   │  Catalog  │  │StockLedger│  │SalesJournl│  │  Money    │  │   │
//! │  │   │           │  │ReservPlan │  │SaleFilter │  │  Percent  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Kit, Sale and their enums
//! - [`money`] - Integer-cent money and basis-point percentages
//! - [`ledger`] - Stock ledger: registration, kits, reservations
//! - [`journal`] - Sales journal: recording, metrics, filtering
//! - [`catalog`] - Session context bundling ledger and journal
//! - [`report`] - Stock overview, kit listing, dashboard
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level input checks
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use stockbook_core::{Catalog, Money, NewSale, SaleTarget};
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .register_product("A1", "Savon lavande", 10, Money::from_cents(500), None)
//!     .unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let sale = catalog
//!     .record_sale(NewSale::new("CMD-1", SaleTarget::product("A1"), 3, Money::from_cents(800), day))
//!     .unwrap();
//!
//! assert_eq!(sale.metrics.net_profit.cents(), 900);
//! assert_eq!(sale.metrics.net_margin.bps(), 3750); // 37.50%
//! assert_eq!(catalog.ledger().product("A1").unwrap().remaining_quantity(), 7);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{LedgerError, LedgerResult, Shortage, Shortages, ValidationError};
pub use journal::{DateRange, SaleFilter, SaleQuery, SalesJournal, SalesSummary};
pub use ledger::{Decrement, ReservationPlan, StockLedger};
pub use money::{Money, Percent};
pub use report::{Dashboard, KitLine, KitListing, StockLine, StockOverview};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum SKU length.
pub const MAX_SKU_LEN: usize = 50;

/// Maximum product / kit name length.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of free-text sale fields (buyer, comment, order number).
pub const MAX_TEXT_LEN: usize = 2000;
