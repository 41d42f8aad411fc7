//! # Reports
//!
//! Read-only views over a [`Catalog`] for the dashboard and listings.
//!
//! ```text
//! StockOverview                          KitListing
//! ─────────────────────────────          ───────────────────────────────
//! SKU │ Name │ Left/Init │ Price │ Img   K1 (k1.png)
//! A1  │ ...  │  7 / 10   │ 5.00  │ ✓       2 × A1 Savon lavande
//! A2  │ ...  │  2 / 2    │ 3.00  │ ✗       3 × A2 Bougie
//! ```

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::LedgerResult;
use crate::journal::{SaleFilter, SalesSummary};
use crate::money::Money;

/// One product line of the stock overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLine {
    pub sku: String,
    pub name: String,
    pub initial_quantity: i64,
    pub remaining_quantity: i64,
    pub unit_price: Money,
    pub image_ref: Option<String>,
}

impl StockLine {
    pub fn has_image(&self) -> bool {
        self.image_ref.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining_quantity == 0
    }
}

/// Every product with its stock, plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockOverview {
    pub lines: Vec<StockLine>,
    /// Σ remaining × unit price.
    pub stock_value: Money,
}

impl StockOverview {
    pub fn from_catalog(catalog: &Catalog) -> LedgerResult<Self> {
        let ledger = catalog.ledger();
        let lines = ledger
            .products()
            .iter()
            .map(|p| StockLine {
                sku: p.sku().to_string(),
                name: p.name().to_string(),
                initial_quantity: p.initial_quantity(),
                remaining_quantity: p.remaining_quantity(),
                unit_price: p.unit_price(),
                image_ref: p.image_ref().map(str::to_string),
            })
            .collect();

        Ok(StockOverview {
            lines,
            stock_value: ledger.stock_value()?,
        })
    }

    /// SKUs of products registered without an image reference.
    pub fn missing_images(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| !line.has_image())
            .map(|line| line.sku.as_str())
    }

    pub fn sold_out(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.is_sold_out())
            .map(|line| line.sku.as_str())
    }
}

/// A kit component resolved to its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KitLine {
    pub sku: String,
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KitListing {
    pub name: String,
    pub image_ref: Option<String>,
    pub components: Vec<KitLine>,
}

impl KitListing {
    /// Every kit in composition order.
    pub fn all(catalog: &Catalog) -> LedgerResult<Vec<KitListing>> {
        let ledger = catalog.ledger();
        ledger
            .kits()
            .iter()
            .map(|kit| {
                let components = ledger
                    .kit_contents(kit.name())?
                    .into_iter()
                    .map(|(component, product)| KitLine {
                        sku: component.sku.clone(),
                        product_name: product.name().to_string(),
                        quantity: component.quantity,
                    })
                    .collect();
                Ok(KitListing {
                    name: kit.name().to_string(),
                    image_ref: kit.image_ref().map(str::to_string),
                    components,
                })
            })
            .collect()
    }
}

/// Everything the dashboard shows at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub stock: StockOverview,
    pub kits: Vec<KitListing>,
    pub sales: SalesSummary,
}

impl Dashboard {
    pub fn build(catalog: &Catalog, filter: &SaleFilter) -> LedgerResult<Self> {
        Ok(Dashboard {
            stock: StockOverview::from_catalog(catalog)?,
            kits: KitListing::all(catalog)?,
            sales: catalog.summary(filter)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KitComponent, NewSale, SaleTarget};
    use chrono::NaiveDate;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register_product("A1", "Savon lavande", 10, Money::from_cents(500), Some("a1.png".into()))
            .unwrap();
        catalog
            .register_product("A2", "Bougie", 2, Money::from_cents(300), None)
            .unwrap();
        catalog
            .compose_kit(
                "K1",
                vec![KitComponent::new("A1", 2), KitComponent::new("A2", 1)],
                Some("k1.png".into()),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_overview_flags_missing_images_and_sold_out() {
        let mut catalog = catalog();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        catalog
            .record_sale(NewSale::new("1", SaleTarget::kit("K1"), 2, Money::from_cents(2000), day))
            .unwrap();

        let overview = StockOverview::from_catalog(&catalog).unwrap();
        assert_eq!(overview.missing_images().collect::<Vec<_>>(), vec!["A2"]);
        assert_eq!(overview.sold_out().collect::<Vec<_>>(), vec!["A2"]);
        // 6 × 5.00
        assert_eq!(overview.stock_value, Money::from_cents(3000));
    }

    #[test]
    fn test_kit_listing_resolves_product_names() {
        let kits = KitListing::all(&catalog()).unwrap();
        assert_eq!(kits.len(), 1);
        assert_eq!(kits[0].image_ref.as_deref(), Some("k1.png"));
        assert_eq!(kits[0].components[0].product_name, "Savon lavande");
        assert_eq!(kits[0].components[1].quantity, 1);
    }

    #[test]
    fn test_dashboard_on_empty_catalog() {
        let dashboard = Dashboard::build(&Catalog::new(), &SaleFilter::all()).unwrap();
        assert!(dashboard.stock.lines.is_empty());
        assert!(dashboard.kits.is_empty());
        assert_eq!(dashboard.sales.sales, 0);
    }
}
