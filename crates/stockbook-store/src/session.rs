//! # Session
//!
//! A [`Catalog`] paired with the [`Store`] it was loaded from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session::open(config)                                                  │
//! │       │  Store::open + load_catalog                                     │
//! │       ▼                                                                 │
//! │  register_product ──► Catalog mutation ──► flush [products]             │
//! │  compose_kit      ──► Catalog mutation ──► flush [kits]                 │
//! │  record_sale      ──► Catalog mutation ──► flush [products, sales]      │
//! │                                                                         │
//! │  A rejected mutation (LedgerError) flushes nothing.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{error, info};

use crate::error::StoreResult;
use crate::pool::{Store, StoreConfig};
use crate::repository::Table;
use stockbook_core::{
    Catalog, Kit, KitComponent, Money, NewSale, Product, Sale, SaleFilter, SaleMetrics, SaleQuery,
    SalesSummary,
};

/// The working state of one user session.
#[derive(Debug)]
pub struct Session {
    store: Store,
    catalog: Catalog,
}

impl Session {
    /// Opens the store and loads everything in it.
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        let store = Store::open(config).await?;
        Session::load(store).await
    }

    /// Loads the catalog from an already open store.
    pub async fn load(store: Store) -> StoreResult<Self> {
        let catalog = store.load_catalog().await?;
        Ok(Session { store, catalog })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn register_product(
        &mut self,
        sku: &str,
        name: &str,
        initial_quantity: i64,
        unit_price: Money,
        image_ref: Option<String>,
    ) -> StoreResult<Product> {
        let product = self
            .catalog
            .register_product(sku, name, initial_quantity, unit_price, image_ref)?
            .clone();

        self.flush(&[Table::Products]).await?;
        Ok(product)
    }

    pub async fn compose_kit(
        &mut self,
        name: &str,
        components: Vec<KitComponent>,
        image_ref: Option<String>,
    ) -> StoreResult<Kit> {
        let kit = self.catalog.compose_kit(name, components, image_ref)?.clone();

        self.flush(&[Table::Kits]).await?;
        Ok(kit)
    }

    /// Records a sale and persists the stock decrement with it.
    pub async fn record_sale(&mut self, new_sale: NewSale) -> StoreResult<Sale> {
        let sale = self.catalog.record_sale(new_sale)?.clone();

        self.flush(&[Table::Products, Table::Sales]).await?;
        Ok(sale)
    }

    pub fn preview_sale(&self, new_sale: &NewSale) -> StoreResult<SaleMetrics> {
        Ok(self.catalog.preview_sale(new_sale)?)
    }

    pub fn query<'a>(&'a self, filter: &'a SaleFilter) -> SaleQuery<'a> {
        self.catalog.query(filter)
    }

    pub fn summary(&self, filter: &SaleFilter) -> StoreResult<SalesSummary> {
        Ok(self.catalog.summary(filter)?)
    }

    /// Closes the underlying store.
    pub async fn close(self) {
        self.store.close().await;
    }

    async fn flush(&self, tables: &[Table]) -> StoreResult<()> {
        self.store.flush(&self.catalog, tables).await.map_err(|err| {
            // The in-memory catalog is ahead of the file from here on.
            error!(error = %err, tables = ?tables, "Flush failed");
            err
        })?;
        info!(path = %self.store.path().display(), tables = ?tables, "Changes saved");
        Ok(())
    }
}
