//! # Repository Module
//!
//! One repository per table. Each can load every row and replace the
//! whole table.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session                                                                │
//! │     │  load_catalog()              flush(&catalog, &[Products, Sales])  │
//! │     ▼                                    │                              │
//! │  ProductRepository ── products           │  one transaction:            │
//! │  KitRepository     ── kits               │  DELETE + INSERT per table   │
//! │  SaleRepository    ── sales              ▼                              │
//! │                                       SQLite                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`ProductRepository`](product::ProductRepository)
//! - [`KitRepository`](kit::KitRepository)
//! - [`SaleRepository`](sale::SaleRepository)

use std::fmt;

pub mod kit;
pub mod product;
pub mod sale;

/// The three tables of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Kits,
    Sales,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Products, Table::Kits, Table::Sales];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Kits => "kits",
            Table::Sales => "sales",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
