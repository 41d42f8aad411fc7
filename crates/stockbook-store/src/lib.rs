//! # stockbook-store: Persistence Layer for Stockbook
//!
//! Keeps the catalog in a local SQLite file via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  CLI command (sale record)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockbook-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Session    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (session.rs)  │    │ products      │    │  (embedded)  │  │   │
//! │  │   │ Catalog+Store │───►│ kits          │    │ 001_init.sql │  │   │
//! │  │   │               │    │ sales         │    │ 002_metrics  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite store file                           │   │
//! │  │   $STOCKBOOK_DB_PATH or <data dir>/stockbook.db                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Store configuration, opening, load and flush
//! - [`session`] - Catalog plus store, flushing after each mutation
//! - [`repository`] - One repository per table
//! - [`migrations`] - Embedded schema migrations
//! - [`export`] - CSV export of sales
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_store::{Session, StoreConfig};
//!
//! let mut session = Session::open(StoreConfig::from_env()?).await?;
//! session.register_product("A1", "Savon", 10, Money::from_cents(500), None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod export;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use export::write_sales_csv;
pub use pool::{default_database_path, Store, StoreConfig, DB_PATH_ENV};
pub use repository::Table;
pub use session::Session;

// Repository re-exports for convenience
pub use repository::kit::KitRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
