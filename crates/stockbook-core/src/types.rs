//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Kit        │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sku (unique)   │◄──│  name (unique)  │   │  sequence       │       │
//! │  │  name           │   │  components     │   │  order_number   │       │
//! │  │  initial qty    │   │  (sku, qty)     │   │  target ────────┼──► Product | Kit
//! │  │  remaining qty  │   │  image_ref      │   │  metrics        │       │
//! │  │  unit_price     │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   SaleTarget    │   │    Carrier      │   │   Platform      │       │
//! │  │  Product(sku)   │   │  Colissimo, UPS │   │  Amazon, Vinted │       │
//! │  │  Kit(name)      │   │  ... Other      │   │  ... Other      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products and kits are looked up by their unique key only (SKU, kit
//! name). Display names are never used as keys.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::money::{Money, Percent};
use crate::validation::{validate_amount, validate_name, validate_sku};

// =============================================================================
// Product
// =============================================================================

/// A product held in stock.
///
/// `remaining_quantity` is only ever changed by the
/// [`StockLedger`](crate::ledger::StockLedger); there is no public setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    sku: String,
    name: String,
    initial_quantity: i64,
    remaining_quantity: i64,
    unit_price: Money,
    image_ref: Option<String>,
}

impl Product {
    /// Builds a freshly registered product: remaining equals initial.
    pub(crate) fn new(
        sku: String,
        name: String,
        initial_quantity: i64,
        unit_price: Money,
        image_ref: Option<String>,
    ) -> Self {
        Product {
            sku,
            name,
            initial_quantity,
            remaining_quantity: initial_quantity,
            unit_price,
            image_ref,
        }
    }

    /// Rebuilds a product from persisted fields, enforcing
    /// `0 <= remaining <= initial`.
    pub fn restore(
        sku: impl Into<String>,
        name: impl Into<String>,
        initial_quantity: i64,
        remaining_quantity: i64,
        unit_price: Money,
        image_ref: Option<String>,
    ) -> LedgerResult<Self> {
        let sku = sku.into();
        let name = name.into();

        validate_sku(&sku)?;
        validate_name("name", &name)?;
        validate_amount("unit price", unit_price)?;

        if initial_quantity < 0 {
            return Err(LedgerError::invalid_quantity("initial quantity", initial_quantity));
        }
        if remaining_quantity < 0 || remaining_quantity > initial_quantity {
            return Err(LedgerError::invalid_quantity(
                "remaining quantity",
                remaining_quantity,
            ));
        }

        Ok(Product {
            sku,
            name,
            initial_quantity,
            remaining_quantity,
            unit_price,
            image_ref,
        })
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_quantity(&self) -> i64 {
        self.initial_quantity
    }

    pub fn remaining_quantity(&self) -> i64 {
        self.remaining_quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    /// Checks if `quantity` units can be taken from stock.
    pub fn can_supply(&self, quantity: i64) -> bool {
        self.remaining_quantity >= quantity
    }

    pub(crate) fn decrement(&mut self, quantity: i64) {
        debug_assert!(quantity >= 0 && quantity <= self.remaining_quantity);
        self.remaining_quantity -= quantity;
    }
}

// =============================================================================
// Kit
// =============================================================================

/// One line of a kit: `quantity` units of the product `sku` per kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitComponent {
    pub sku: String,
    pub quantity: i64,
}

impl KitComponent {
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        KitComponent {
            sku: sku.into(),
            quantity,
        }
    }
}

/// A named bundle of products sold as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kit {
    name: String,
    components: Vec<KitComponent>,
    image_ref: Option<String>,
}

impl Kit {
    /// Builds a kit, merging repeated SKUs and rejecting empty kits and
    /// non-positive quantities. Component existence is checked by the ledger.
    pub fn restore(
        name: impl Into<String>,
        components: Vec<KitComponent>,
        image_ref: Option<String>,
    ) -> LedgerResult<Self> {
        let name = name.into();
        validate_name("kit name", &name)?;

        if components.is_empty() {
            return Err(LedgerError::EmptyKit);
        }

        let mut merged: Vec<KitComponent> = Vec::with_capacity(components.len());
        for component in components {
            if component.quantity <= 0 {
                return Err(LedgerError::invalid_quantity(
                    format!("component {}", component.sku),
                    component.quantity,
                ));
            }
            match merged.iter_mut().find(|c| c.sku == component.sku) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(component.quantity)
                        .ok_or_else(|| {
                            LedgerError::invalid_quantity(
                                format!("component {}", component.sku),
                                component.quantity,
                            )
                        })?;
                }
                None => merged.push(component),
            }
        }

        Ok(Kit {
            name,
            components: merged,
            image_ref,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[KitComponent] {
        &self.components
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }
}

// =============================================================================
// Sale Target
// =============================================================================

/// What a sale sells: a single product or a kit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum SaleTarget {
    Product(String),
    Kit(String),
}

impl SaleTarget {
    pub fn product(sku: impl Into<String>) -> Self {
        SaleTarget::Product(sku.into())
    }

    pub fn kit(name: impl Into<String>) -> Self {
        SaleTarget::Kit(name.into())
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            SaleTarget::Product(_) => TargetKind::Product,
            SaleTarget::Kit(_) => TargetKind::Kit,
        }
    }

    /// The SKU or kit name.
    pub fn key(&self) -> &str {
        match self {
            SaleTarget::Product(sku) => sku,
            SaleTarget::Kit(name) => name,
        }
    }

    pub fn from_parts(kind: TargetKind, key: impl Into<String>) -> Self {
        match kind {
            TargetKind::Product => SaleTarget::Product(key.into()),
            TargetKind::Kit => SaleTarget::Kit(key.into()),
        }
    }
}

impl fmt::Display for SaleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleTarget::Product(sku) => write!(f, "product {}", sku),
            SaleTarget::Kit(name) => write!(f, "kit {}", name),
        }
    }
}

/// Tag stored next to the target key in the sales table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Product,
    Kit,
}

// =============================================================================
// Carrier & Platform
// =============================================================================

/// Shipping carrier offered on the sale form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Carrier {
    Colissimo,
    Ups,
    MondialRelay,
    LaPoste,
    Other,
}

impl Carrier {
    pub const ALL: [Carrier; 5] = [
        Carrier::Colissimo,
        Carrier::Ups,
        Carrier::MondialRelay,
        Carrier::LaPoste,
        Carrier::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Carrier::Colissimo => "Colissimo",
            Carrier::Ups => "UPS",
            Carrier::MondialRelay => "Mondial Relay",
            Carrier::LaPoste => "La Poste",
            Carrier::Other => "Other",
        }
    }
}

impl Default for Carrier {
    fn default() -> Self {
        Carrier::Other
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Carrier {
    type Err = ValidationError;

    /// Accepts the label or the snake_case name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Carrier::ALL
            .into_iter()
            .find(|c| normalize_label(c.label()) == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "carrier".to_string(),
                allowed: Carrier::ALL.iter().map(|c| c.label().to_string()).collect(),
            })
    }
}

/// Sales channel the order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Amazon,
    Vinted,
    SocialMedia,
    Other,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Amazon,
        Platform::Vinted,
        Platform::SocialMedia,
        Platform::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Amazon => "Amazon",
            Platform::Vinted => "Vinted",
            Platform::SocialMedia => "Social Media",
            Platform::Other => "Other",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Other
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Platform::ALL
            .into_iter()
            .find(|p| normalize_label(p.label()) == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "platform".to_string(),
                allowed: Platform::ALL.iter().map(|p| p.label().to_string()).collect(),
            })
    }
}

/// "Mondial Relay", "mondial_relay" and "MONDIAL-RELAY" all compare equal.
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

// =============================================================================
// Sale Metrics
// =============================================================================

/// Financial figures derived once when a sale is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleMetrics {
    /// quantity × unit price − additional fees − shipping fees
    pub total_sale_price: Money,
    /// quantity × unit cost
    pub total_cost: Money,
    /// total sale price − total cost
    pub net_profit: Money,
    /// net profit / total sale price, zero when the sale price is not positive
    pub net_margin: Percent,
}

impl SaleMetrics {
    /// Computes the derived figures for one sale.
    ///
    /// Fails with `AmountOverflow` when a total leaves the cent range.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::{Money, SaleMetrics};
    ///
    /// let metrics = SaleMetrics::compute(
    ///     3,
    ///     Money::from_cents(800),
    ///     Money::zero(),
    ///     Money::zero(),
    ///     Money::from_cents(500),
    /// )
    /// .unwrap();
    /// assert_eq!(metrics.total_sale_price.cents(), 2400);
    /// assert_eq!(metrics.total_cost.cents(), 1500);
    /// assert_eq!(metrics.net_profit.cents(), 900);
    /// assert_eq!(metrics.net_margin.bps(), 3750);
    /// ```
    pub fn compute(
        quantity: i64,
        unit_price: Money,
        additional_fees: Money,
        shipping_fees: Money,
        unit_cost: Money,
    ) -> LedgerResult<Self> {
        let total_sale_price = unit_price
            .checked_mul(quantity)
            .and_then(|gross| gross.checked_sub(additional_fees))
            .and_then(|net| net.checked_sub(shipping_fees))
            .ok_or_else(|| LedgerError::overflow("total sale price"))?;
        let total_cost = unit_cost
            .checked_mul(quantity)
            .ok_or_else(|| LedgerError::overflow("total cost"))?;
        let net_profit = total_sale_price
            .checked_sub(total_cost)
            .ok_or_else(|| LedgerError::overflow("net profit"))?;
        let net_margin = Percent::of(net_profit, total_sale_price);

        Ok(SaleMetrics {
            total_sale_price,
            total_cost,
            net_profit,
            net_margin,
        })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Position in the journal, starting at 1.
    pub sequence: u64,
    /// Marketplace order number; not required to be unique.
    pub order_number: String,
    pub target: SaleTarget,
    pub quantity: i64,
    pub unit_price: Money,
    pub additional_fees: Money,
    pub shipping_fees: Money,
    pub carrier: Carrier,
    pub buyer: String,
    pub comment: String,
    pub platform: Platform,
    pub entry_date: NaiveDate,
    pub shipping_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub metrics: SaleMetrics,
}

/// A sale as entered, before validation and metric computation.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use stockbook_core::{Carrier, Money, NewSale, Platform, SaleTarget};
///
/// let sale = NewSale::new(
///     "CMD-001",
///     SaleTarget::product("A1"),
///     3,
///     Money::from_cents(800),
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
/// )
/// .carrier(Carrier::Colissimo)
/// .platform(Platform::Vinted)
/// .buyer("Jeanne");
/// assert_eq!(sale.quantity, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub order_number: String,
    pub target: SaleTarget,
    pub quantity: i64,
    pub unit_price: Money,
    pub additional_fees: Money,
    pub shipping_fees: Money,
    pub carrier: Carrier,
    pub buyer: String,
    pub comment: String,
    pub platform: Platform,
    pub entry_date: NaiveDate,
    pub shipping_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

impl NewSale {
    /// Creates a sale with no fees, carrier/platform `Other` and no
    /// shipping or delivery date.
    pub fn new(
        order_number: impl Into<String>,
        target: SaleTarget,
        quantity: i64,
        unit_price: Money,
        entry_date: NaiveDate,
    ) -> Self {
        NewSale {
            order_number: order_number.into(),
            target,
            quantity,
            unit_price,
            additional_fees: Money::zero(),
            shipping_fees: Money::zero(),
            carrier: Carrier::default(),
            buyer: String::new(),
            comment: String::new(),
            platform: Platform::default(),
            entry_date,
            shipping_date: None,
            delivery_date: None,
        }
    }

    pub fn additional_fees(mut self, fees: Money) -> Self {
        self.additional_fees = fees;
        self
    }

    pub fn shipping_fees(mut self, fees: Money) -> Self {
        self.shipping_fees = fees;
        self
    }

    pub fn carrier(mut self, carrier: Carrier) -> Self {
        self.carrier = carrier;
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = buyer.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn shipping_date(mut self, date: NaiveDate) -> Self {
        self.shipping_date = Some(date);
        self
    }

    pub fn delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    /// Freezes this entry into a journal record.
    pub(crate) fn into_sale(self, sequence: u64, metrics: SaleMetrics) -> Sale {
        Sale {
            sequence,
            order_number: self.order_number,
            target: self.target,
            quantity: self.quantity,
            unit_price: self.unit_price,
            additional_fees: self.additional_fees,
            shipping_fees: self.shipping_fees,
            carrier: self.carrier,
            buyer: self.buyer,
            comment: self.comment,
            platform: self.platform,
            entry_date: self.entry_date,
            shipping_date: self.shipping_date,
            delivery_date: self.delivery_date,
            metrics,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
