//! # Stock Ledger
//!
//! Owns products and kits and is the only writer of remaining quantities.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reserving Stock For A Sale                           │
//! │                                                                         │
//! │  check_and_reserve(Kit "K1", 2)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Expand: K1 = {A1: 2, A2: 3}  →  A1 needs 4, A2 needs 6                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Compare EVERY component against remaining stock                       │
//! │       │                                                                 │
//! │       ├── any short? → InsufficientStock([...all shortfalls...])       │
//! │       │                (nothing mutated)                                │
//! │       │                                                                 │
//! │       └── all fine  → ReservationPlan { A1 -4, A2 -6 }                 │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                         apply(plan) → all decrements, or none          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::error::{LedgerError, LedgerResult, Shortage, Shortages};
use crate::money::Money;
use crate::types::{Kit, KitComponent, Product, SaleTarget};
use crate::validation::{validate_amount, validate_name, validate_sku};

// =============================================================================
// Reservation Plan
// =============================================================================

/// One product decrement inside a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrement {
    pub sku: String,
    pub quantity: i64,
}

/// The validated set of decrements needed to fulfil one sale.
///
/// Only [`StockLedger::check_and_reserve`] builds plans, so holding one
/// means every decrement was covered by stock at check time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationPlan {
    target: SaleTarget,
    quantity: i64,
    decrements: Vec<Decrement>,
}

impl ReservationPlan {
    pub fn target(&self) -> &SaleTarget {
        &self.target
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn decrements(&self) -> &[Decrement] {
        &self.decrements
    }
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// Product and kit catalog with stock bookkeeping.
///
/// Records are kept in insertion order; the indexes map SKU / kit name to
/// a position.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    products: Vec<Product>,
    product_index: HashMap<String, usize>,
    kits: Vec<Kit>,
    kit_index: HashMap<String, usize>,
}

impl StockLedger {
    /// An empty catalog. This is a valid starting state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted records.
    ///
    /// Applies the same uniqueness and reference rules as registration, so
    /// a hand-edited store with duplicate SKUs or dangling kit components
    /// is rejected instead of silently resolving to the first match.
    pub fn restore(products: Vec<Product>, kits: Vec<Kit>) -> LedgerResult<Self> {
        let mut ledger = StockLedger::new();

        for product in products {
            if ledger.product_index.contains_key(product.sku()) {
                return Err(LedgerError::DuplicateSku(product.sku().to_string()));
            }
            ledger.insert_product(product);
        }

        for kit in kits {
            if ledger.kit_index.contains_key(kit.name()) {
                return Err(LedgerError::DuplicateKitName(kit.name().to_string()));
            }
            ledger.ensure_components_exist(kit.components())?;
            ledger.insert_kit(kit);
        }

        debug!(
            products = ledger.products.len(),
            kits = ledger.kits.len(),
            "Ledger restored"
        );
        Ok(ledger)
    }

    // =========================================================================
    // Catalog Mutations
    // =========================================================================

    /// Registers a new product with `remaining == initial`.
    ///
    /// ## Errors
    /// - `DuplicateSku` if the SKU is taken (existing record untouched)
    /// - `InvalidQuantity` if `initial_quantity < 0`
    /// - `Validation` for a blank SKU/name or negative price
    pub fn register_product(
        &mut self,
        sku: &str,
        name: &str,
        initial_quantity: i64,
        unit_price: Money,
        image_ref: Option<String>,
    ) -> LedgerResult<&Product> {
        let sku = sku.trim();
        let name = name.trim();

        validate_sku(sku)?;
        validate_name("name", name)?;
        validate_amount("unit price", unit_price)?;

        if self.product_index.contains_key(sku) {
            return Err(LedgerError::DuplicateSku(sku.to_string()));
        }
        if initial_quantity < 0 {
            return Err(LedgerError::invalid_quantity("initial quantity", initial_quantity));
        }

        debug!(sku = %sku, initial_quantity, unit_price = %unit_price, "Registering product");

        let product = Product::new(
            sku.to_string(),
            name.to_string(),
            initial_quantity,
            unit_price,
            image_ref,
        );
        let idx = self.insert_product(product);
        Ok(&self.products[idx])
    }

    /// Composes a new kit from existing products.
    ///
    /// ## Errors
    /// - `DuplicateKitName`
    /// - `EmptyKit` when `components` is empty
    /// - `InvalidQuantity` when a component quantity is not positive
    /// - `UnknownSku` when a component references a missing product
    pub fn compose_kit(
        &mut self,
        name: &str,
        components: Vec<KitComponent>,
        image_ref: Option<String>,
    ) -> LedgerResult<&Kit> {
        let name = name.trim();
        validate_name("kit name", name)?;

        if self.kit_index.contains_key(name) {
            return Err(LedgerError::DuplicateKitName(name.to_string()));
        }

        let kit = Kit::restore(name, components, image_ref)?;
        self.ensure_components_exist(kit.components())?;

        debug!(kit = %name, components = kit.components().len(), "Composing kit");

        let idx = self.insert_kit(kit);
        Ok(&self.kits[idx])
    }

    // =========================================================================
    // Stock Reservation
    // =========================================================================

    /// Validates that `quantity` units of `target` can be sold and returns
    /// the decrements to apply.
    ///
    /// Every component is checked against current stock before anything
    /// is decided; all shortfalls are reported together.
    pub fn check_and_reserve(
        &self,
        target: &SaleTarget,
        quantity: i64,
    ) -> LedgerResult<ReservationPlan> {
        if quantity <= 0 {
            return Err(LedgerError::invalid_quantity("quantity sold", quantity));
        }

        let decrements = self.expand(target, quantity)?;

        let shortages: Vec<Shortage> = decrements
            .iter()
            .filter_map(|d| {
                let product = self.product(&d.sku)?;
                (!product.can_supply(d.quantity)).then(|| {
                    Shortage::new(d.sku.clone(), product.remaining_quantity(), d.quantity)
                })
            })
            .collect();

        if !shortages.is_empty() {
            debug!(target = %target, quantity, shortages = shortages.len(), "Stock check failed");
            return Err(LedgerError::InsufficientStock(Shortages(shortages)));
        }

        Ok(ReservationPlan {
            target: target.clone(),
            quantity,
            decrements,
        })
    }

    /// Applies every decrement in `plan`.
    ///
    /// The plan is re-checked against current stock first, so a plan that
    /// went stale is rejected whole rather than half-applied.
    pub fn apply(&mut self, plan: ReservationPlan) -> LedgerResult<()> {
        let mut positions = Vec::with_capacity(plan.decrements.len());
        let mut shortages = Vec::new();

        for d in &plan.decrements {
            let idx = *self
                .product_index
                .get(&d.sku)
                .ok_or_else(|| LedgerError::UnknownSku(d.sku.clone()))?;
            let product = &self.products[idx];
            if !product.can_supply(d.quantity) {
                shortages.push(Shortage::new(
                    d.sku.clone(),
                    product.remaining_quantity(),
                    d.quantity,
                ));
            }
            positions.push((idx, d.quantity));
        }

        if !shortages.is_empty() {
            return Err(LedgerError::InsufficientStock(Shortages(shortages)));
        }

        for (idx, quantity) in positions {
            self.products[idx].decrement(quantity);
        }

        debug!(target = %plan.target, quantity = plan.quantity, "Stock decremented");
        Ok(())
    }

    /// Cost basis of one unit of `target`.
    ///
    /// A product's own unit price, or Σ component_qty × component price for
    /// a kit. The caller multiplies by the quantity sold.
    pub fn unit_cost(&self, target: &SaleTarget) -> LedgerResult<Money> {
        match target {
            SaleTarget::Product(sku) => self
                .product(sku)
                .map(Product::unit_price)
                .ok_or_else(|| LedgerError::UnknownSku(sku.clone())),
            SaleTarget::Kit(name) => {
                let kit = self
                    .kit(name)
                    .ok_or_else(|| LedgerError::UnknownKit(name.clone()))?;
                kit.components().iter().try_fold(Money::zero(), |total, c| {
                    let product = self
                        .product(&c.sku)
                        .ok_or_else(|| LedgerError::UnknownSku(c.sku.clone()))?;
                    product
                        .unit_price()
                        .checked_mul(c.quantity)
                        .and_then(|line| total.checked_add(line))
                        .ok_or_else(|| LedgerError::overflow("kit unit cost"))
                })
            }
        }
    }

    // =========================================================================
    // Read Interface
    // =========================================================================

    pub fn product(&self, sku: &str) -> Option<&Product> {
        self.product_index.get(sku).map(|&idx| &self.products[idx])
    }

    pub fn kit(&self, name: &str) -> Option<&Kit> {
        self.kit_index.get(name).map(|&idx| &self.kits[idx])
    }

    /// Products in registration order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Kits in composition order.
    pub fn kits(&self) -> &[Kit] {
        &self.kits
    }

    /// Resolves a kit's components to their products, for listing.
    pub fn kit_contents(&self, name: &str) -> LedgerResult<Vec<(&KitComponent, &Product)>> {
        let kit = self
            .kit(name)
            .ok_or_else(|| LedgerError::UnknownKit(name.to_string()))?;
        kit.components()
            .iter()
            .map(|c| {
                self.product(&c.sku)
                    .map(|p| (c, p))
                    .ok_or_else(|| LedgerError::UnknownSku(c.sku.clone()))
            })
            .collect()
    }

    /// Total stock value at unit price.
    pub fn stock_value(&self) -> LedgerResult<Money> {
        self.products.iter().try_fold(Money::zero(), |total, p| {
            p.unit_price()
                .checked_mul(p.remaining_quantity())
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| LedgerError::overflow("stock value"))
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn expand(&self, target: &SaleTarget, quantity: i64) -> LedgerResult<Vec<Decrement>> {
        match target {
            SaleTarget::Product(sku) => {
                if self.product(sku).is_none() {
                    return Err(LedgerError::UnknownSku(sku.clone()));
                }
                Ok(vec![Decrement {
                    sku: sku.clone(),
                    quantity,
                }])
            }
            SaleTarget::Kit(name) => {
                let kit = self
                    .kit(name)
                    .ok_or_else(|| LedgerError::UnknownKit(name.clone()))?;
                kit.components()
                    .iter()
                    .map(|c| {
                        let required = c.quantity.checked_mul(quantity).ok_or_else(|| {
                            LedgerError::invalid_quantity("quantity sold", quantity)
                        })?;
                        Ok(Decrement {
                            sku: c.sku.clone(),
                            quantity: required,
                        })
                    })
                    .collect()
            }
        }
    }

    fn ensure_components_exist(&self, components: &[KitComponent]) -> LedgerResult<()> {
        match components.iter().find(|c| self.product(&c.sku).is_none()) {
            Some(missing) => Err(LedgerError::UnknownSku(missing.sku.clone())),
            None => Ok(()),
        }
    }

    fn insert_product(&mut self, product: Product) -> usize {
        let idx = self.products.len();
        self.product_index.insert(product.sku().to_string(), idx);
        self.products.push(product);
        idx
    }

    fn insert_kit(&mut self, kit: Kit) -> usize {
        let idx = self.kits.len();
        self.kit_index.insert(kit.name().to_string(), idx);
        self.kits.push(kit);
        idx
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(products: &[(&str, i64, i64)]) -> StockLedger {
        let mut ledger = StockLedger::new();
        for (sku, qty, price) in products {
            ledger
                .register_product(sku, &format!("Product {}", sku), *qty, Money::from_cents(*price), None)
                .unwrap();
        }
        ledger
    }

    fn remaining(ledger: &StockLedger, sku: &str) -> i64 {
        ledger.product(sku).unwrap().remaining_quantity()
    }

    #[test]
    fn test_register_product_starts_full() {
        let mut ledger = StockLedger::new();
        let product = ledger
            .register_product("A1", "Savon", 10, Money::from_cents(500), Some("img/A1.jpg".into()))
            .unwrap();

        assert_eq!(product.remaining_quantity(), 10);
        assert_eq!(product.initial_quantity(), 10);
        assert_eq!(product.image_ref(), Some("img/A1.jpg"));
    }

    #[test]
    fn test_register_duplicate_sku_leaves_existing_record() {
        let mut ledger = ledger_with(&[("A1", 10, 500)]);

        let err = ledger
            .register_product("A1", "Other name", 99, Money::from_cents(1), None)
            .unwrap_err();

        assert_eq!(err, LedgerError::DuplicateSku("A1".to_string()));
        let product = ledger.product("A1").unwrap();
        assert_eq!(product.name(), "Product A1");
        assert_eq!(product.initial_quantity(), 10);
        assert_eq!(ledger.products().len(), 1);
    }

    #[test]
    fn test_register_negative_quantity() {
        let mut ledger = StockLedger::new();
        let err = ledger
            .register_product("A1", "Savon", -1, Money::zero(), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity { value: -1, .. }));
        assert!(ledger.products().is_empty());
    }

    #[test]
    fn test_same_display_name_different_skus_stay_distinct() {
        let mut ledger = StockLedger::new();
        ledger.register_product("A1", "Savon", 5, Money::from_cents(300), None).unwrap();
        ledger.register_product("A2", "Savon", 8, Money::from_cents(900), None).unwrap();

        assert_eq!(ledger.unit_cost(&SaleTarget::product("A2")).unwrap().cents(), 900);
    }

    #[test]
    fn test_compose_kit_errors() {
        let mut ledger = ledger_with(&[("A1", 10, 500)]);

        assert_eq!(
            ledger.compose_kit("K1", vec![], None).unwrap_err(),
            LedgerError::EmptyKit
        );
        assert_eq!(
            ledger
                .compose_kit("K1", vec![KitComponent::new("ZZ", 1)], None)
                .unwrap_err(),
            LedgerError::UnknownSku("ZZ".to_string())
        );
        assert!(matches!(
            ledger
                .compose_kit("K1", vec![KitComponent::new("A1", -2)], None)
                .unwrap_err(),
            LedgerError::InvalidQuantity { value: -2, .. }
        ));

        ledger
            .compose_kit("K1", vec![KitComponent::new("A1", 2)], None)
            .unwrap();
        assert_eq!(
            ledger
                .compose_kit("K1", vec![KitComponent::new("A1", 1)], None)
                .unwrap_err(),
            LedgerError::DuplicateKitName("K1".to_string())
        );
        assert_eq!(ledger.kits().len(), 1);
    }

    #[test]
    fn test_product_reservation() {
        let mut ledger = ledger_with(&[("A1", 10, 500)]);

        let plan = ledger.check_and_reserve(&SaleTarget::product("A1"), 3).unwrap();
        assert_eq!(
            plan.decrements(),
            &[Decrement {
                sku: "A1".to_string(),
                quantity: 3
            }]
        );

        ledger.apply(plan).unwrap();
        assert_eq!(remaining(&ledger, "A1"), 7);
    }

    #[test]
    fn test_product_reservation_exact_stock_is_allowed() {
        let mut ledger = ledger_with(&[("A1", 4, 500)]);
        let plan = ledger.check_and_reserve(&SaleTarget::product("A1"), 4).unwrap();
        ledger.apply(plan).unwrap();
        assert_eq!(remaining(&ledger, "A1"), 0);

        let err = ledger
            .check_and_reserve(&SaleTarget::product("A1"), 1)
            .unwrap_err();
        assert_eq!(err.shortages().unwrap(), &[Shortage::new("A1", 0, 1)]);
    }

    #[test]
    fn test_kit_shortage_is_reported_and_nothing_changes() {
        let mut ledger = ledger_with(&[("A1", 7, 500), ("A2", 2, 300)]);
        ledger
            .compose_kit(
                "K1",
                vec![KitComponent::new("A1", 2), KitComponent::new("A2", 3)],
                None,
            )
            .unwrap();

        let err = ledger
            .check_and_reserve(&SaleTarget::kit("K1"), 1)
            .unwrap_err();

        assert_eq!(err.shortages().unwrap(), &[Shortage::new("A2", 2, 3)]);
        assert_eq!(remaining(&ledger, "A1"), 7);
        assert_eq!(remaining(&ledger, "A2"), 2);
    }

    #[test]
    fn test_kit_reports_every_shortage() {
        let ledger = {
            let mut l = ledger_with(&[("A1", 3, 500), ("A2", 2, 300), ("A3", 50, 100)]);
            l.compose_kit(
                "K1",
                vec![
                    KitComponent::new("A1", 2),
                    KitComponent::new("A2", 3),
                    KitComponent::new("A3", 1),
                ],
                None,
            )
            .unwrap();
            l
        };

        let err = ledger
            .check_and_reserve(&SaleTarget::kit("K1"), 2)
            .unwrap_err();

        assert_eq!(
            err.shortages().unwrap(),
            &[Shortage::new("A1", 3, 4), Shortage::new("A2", 2, 6)]
        );
    }

    #[test]
    fn test_kit_sale_decrements_each_component() {
        let mut ledger = ledger_with(&[("A1", 10, 500), ("A2", 10, 300), ("B9", 10, 100)]);
        ledger
            .compose_kit(
                "K1",
                vec![KitComponent::new("A1", 2), KitComponent::new("A2", 3)],
                None,
            )
            .unwrap();

        let plan = ledger.check_and_reserve(&SaleTarget::kit("K1"), 2).unwrap();
        ledger.apply(plan).unwrap();

        assert_eq!(remaining(&ledger, "A1"), 6);
        assert_eq!(remaining(&ledger, "A2"), 4);
        assert_eq!(remaining(&ledger, "B9"), 10);
    }

    #[test]
    fn test_stale_plan_is_rejected_whole() {
        let mut ledger = ledger_with(&[("A1", 5, 500), ("A2", 5, 300)]);
        ledger
            .compose_kit(
                "K1",
                vec![KitComponent::new("A1", 1), KitComponent::new("A2", 1)],
                None,
            )
            .unwrap();

        let kit_plan = ledger.check_and_reserve(&SaleTarget::kit("K1"), 3).unwrap();
        let drain = ledger.check_and_reserve(&SaleTarget::product("A2"), 4).unwrap();
        ledger.apply(drain).unwrap();

        let err = ledger.apply(kit_plan).unwrap_err();
        assert_eq!(err.shortages().unwrap(), &[Shortage::new("A2", 1, 3)]);
        assert_eq!(remaining(&ledger, "A1"), 5);
        assert_eq!(remaining(&ledger, "A2"), 1);
    }

    #[test]
    fn test_reserve_rejects_unknown_targets_and_bad_quantity() {
        let ledger = ledger_with(&[("A1", 5, 500)]);

        assert_eq!(
            ledger.check_and_reserve(&SaleTarget::product("NOPE"), 1).unwrap_err(),
            LedgerError::UnknownSku("NOPE".to_string())
        );
        assert_eq!(
            ledger.check_and_reserve(&SaleTarget::kit("NOPE"), 1).unwrap_err(),
            LedgerError::UnknownKit("NOPE".to_string())
        );
        assert!(matches!(
            ledger.check_and_reserve(&SaleTarget::product("A1"), 0).unwrap_err(),
            LedgerError::InvalidQuantity { value: 0, .. }
        ));
    }

    #[test]
    fn test_unit_cost() {
        let mut ledger = ledger_with(&[("A1", 10, 500), ("A2", 10, 250)]);
        ledger
            .compose_kit(
                "K1",
                vec![KitComponent::new("A1", 2), KitComponent::new("A2", 3)],
                None,
            )
            .unwrap();

        assert_eq!(ledger.unit_cost(&SaleTarget::product("A1")).unwrap().cents(), 500);
        assert_eq!(ledger.unit_cost(&SaleTarget::kit("K1")).unwrap().cents(), 1750);
    }

    #[test]
    fn test_restore_rejects_duplicates_and_dangling_components() {
        let a1 = Product::restore("A1", "Savon", 10, 10, Money::zero(), None).unwrap();
        let dup = Product::restore("A1", "Savon bis", 3, 3, Money::zero(), None).unwrap();
        assert_eq!(
            StockLedger::restore(vec![a1.clone(), dup], vec![]).unwrap_err(),
            LedgerError::DuplicateSku("A1".to_string())
        );

        let dangling = Kit::restore("K1", vec![KitComponent::new("B2", 1)], None).unwrap();
        assert_eq!(
            StockLedger::restore(vec![a1], vec![dangling]).unwrap_err(),
            LedgerError::UnknownSku("B2".to_string())
        );
    }

    #[test]
    fn test_kit_contents_and_stock_value() {
        let mut ledger = ledger_with(&[("A1", 4, 500), ("A2", 2, 250)]);
        ledger
            .compose_kit("K1", vec![KitComponent::new("A2", 1)], None)
            .unwrap();

        let contents = ledger.kit_contents("K1").unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].1.sku(), "A2");
        assert_eq!(ledger.stock_value().unwrap().cents(), 2500);
    }

    #[test]
    fn test_cost_totals_outside_cent_range() {
        let mut ledger = ledger_with(&[("A1", i64::MAX / 2, 500)]);
        ledger
            .compose_kit("K1", vec![KitComponent::new("A1", i64::MAX / 100)], None)
            .unwrap();

        assert!(matches!(
            ledger.unit_cost(&SaleTarget::kit("K1")),
            Err(LedgerError::AmountOverflow(_))
        ));
        assert!(matches!(ledger.stock_value(), Err(LedgerError::AmountOverflow(_))));
    }
}
