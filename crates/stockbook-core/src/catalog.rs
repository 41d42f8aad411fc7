//! # Catalog
//!
//! The explicit session context: one [`StockLedger`] plus one
//! [`SalesJournal`], owned by whoever drives the session.
//!
//! ```text
//! ┌──────────────────────────── Catalog ────────────────────────────┐
//! │                                                                 │
//! │   StockLedger ◄──── check_and_reserve / apply ──── SalesJournal │
//! │   (products, kits)                                 (sales)      │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::LedgerResult;
use crate::journal::{SaleFilter, SaleQuery, SalesJournal, SalesSummary};
use crate::ledger::StockLedger;
use crate::money::Money;
use crate::types::{Kit, KitComponent, NewSale, Product, Sale, SaleMetrics};

/// Everything one session reads and mutates.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    ledger: StockLedger,
    journal: SalesJournal,
}

impl Catalog {
    /// An empty catalog, the state of a freshly created store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a catalog from an already restored ledger and journal.
    ///
    /// Sales are rebuilt once the ledger exists so that metrics missing
    /// from older stores can be recomputed.
    pub fn from_parts(ledger: StockLedger, journal: SalesJournal) -> Self {
        Catalog { ledger, journal }
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn journal(&self) -> &SalesJournal {
        &self.journal
    }

    pub fn register_product(
        &mut self,
        sku: &str,
        name: &str,
        initial_quantity: i64,
        unit_price: Money,
        image_ref: Option<String>,
    ) -> LedgerResult<&Product> {
        self.ledger
            .register_product(sku, name, initial_quantity, unit_price, image_ref)
    }

    pub fn compose_kit(
        &mut self,
        name: &str,
        components: Vec<KitComponent>,
        image_ref: Option<String>,
    ) -> LedgerResult<&Kit> {
        self.ledger.compose_kit(name, components, image_ref)
    }

    pub fn record_sale(&mut self, new_sale: NewSale) -> LedgerResult<&Sale> {
        self.journal.record_sale(&mut self.ledger, new_sale)
    }

    pub fn preview_sale(&self, new_sale: &NewSale) -> LedgerResult<SaleMetrics> {
        self.journal.preview(&self.ledger, new_sale)
    }

    pub fn query<'a>(&'a self, filter: &'a SaleFilter) -> SaleQuery<'a> {
        self.journal.query(filter)
    }

    pub fn summary(&self, filter: &SaleFilter) -> LedgerResult<SalesSummary> {
        self.journal.summary(filter)
    }
}
