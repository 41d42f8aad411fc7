//! # Sales Journal
//!
//! Append-only sale history with derived metrics and filtered retrieval.
//!
//! ## Recording A Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(ledger, new_sale)                                          │
//! │       │                                                                 │
//! │       ├── field checks (fees, price, text lengths)                     │
//! │       ├── ledger.check_and_reserve(target, qty) ──► Err? return as-is  │
//! │       ├── ledger.unit_cost(target) + SaleMetrics::compute(...)         │
//! │       ├── ledger.apply(plan)                                           │
//! │       └── append Sale { sequence: n + 1, ... }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::StockLedger;
use crate::money::{Money, Percent};
use crate::types::{Carrier, NewSale, Platform, Sale, SaleMetrics};
use crate::validation::{validate_amount, validate_date_range, validate_text, ValidationResult};

// =============================================================================
// Filter
// =============================================================================

/// Inclusive range of entry dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ValidationResult<Self> {
        validate_date_range(start, end)?;
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Conjunctive filter over the sale history.
///
/// An empty carrier or platform set places no constraint, the same as an
/// untouched multiselect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleFilter {
    pub carriers: BTreeSet<Carrier>,
    pub platforms: BTreeSet<Platform>,
    pub date_range: Option<DateRange>,
}

impl SaleFilter {
    /// Matches every sale.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn carriers(mut self, carriers: impl IntoIterator<Item = Carrier>) -> Self {
        self.carriers.extend(carriers);
        self
    }

    pub fn platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms.extend(platforms);
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn matches(&self, sale: &Sale) -> bool {
        (self.carriers.is_empty() || self.carriers.contains(&sale.carrier))
            && (self.platforms.is_empty() || self.platforms.contains(&sale.platform))
            && self
                .date_range
                .map_or(true, |range| range.contains(sale.entry_date))
    }
}

/// Lazy view of the sales matching a filter, in insertion order.
///
/// Cloning restarts the sequence from the beginning of the journal.
#[derive(Debug, Clone)]
pub struct SaleQuery<'a> {
    sales: std::slice::Iter<'a, Sale>,
    filter: &'a SaleFilter,
}

impl<'a> Iterator for SaleQuery<'a> {
    type Item = &'a Sale;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.sales.by_ref().find(|sale| filter.matches(sale))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.sales.size_hint().1)
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Totals over a set of sales, as shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub sales: usize,
    pub units: i64,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
    /// profit / revenue with the same zero clamp as a single sale
    pub margin: Percent,
}

impl SalesSummary {
    /// Fails with `AmountOverflow` if a total leaves the cent range.
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> LedgerResult<Self> {
        let mut summary = SalesSummary::default();
        for sale in sales {
            let metrics = &sale.metrics;
            summary.sales += 1;
            summary.units = summary
                .units
                .checked_add(sale.quantity)
                .ok_or_else(|| LedgerError::overflow("units sold"))?;
            summary.revenue = summary
                .revenue
                .checked_add(metrics.total_sale_price)
                .ok_or_else(|| LedgerError::overflow("revenue"))?;
            summary.cost = summary
                .cost
                .checked_add(metrics.total_cost)
                .ok_or_else(|| LedgerError::overflow("cost"))?;
            summary.profit = summary
                .profit
                .checked_add(metrics.net_profit)
                .ok_or_else(|| LedgerError::overflow("profit"))?;
        }
        summary.margin = Percent::of(summary.profit, summary.revenue);
        Ok(summary)
    }
}

// =============================================================================
// Sales Journal
// =============================================================================

/// Append-only list of recorded sales.
#[derive(Debug, Clone, Default)]
pub struct SalesJournal {
    sales: Vec<Sale>,
}

impl SalesJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the journal from persisted sales, renumbering them in the
    /// order given.
    pub fn restore(sales: Vec<Sale>) -> Self {
        let sales = sales
            .into_iter()
            .enumerate()
            .map(|(i, mut sale)| {
                sale.sequence = i as u64 + 1;
                sale
            })
            .collect();
        SalesJournal { sales }
    }

    /// Validates, reserves stock for, and appends one sale.
    ///
    /// Ledger errors are returned unchanged and leave both the ledger and
    /// the journal untouched. Stock is checked before any money total is
    /// computed, so an oversized quantity is reported as a shortage.
    pub fn record_sale(&mut self, ledger: &mut StockLedger, new_sale: NewSale) -> LedgerResult<&Sale> {
        validate_new_sale(&new_sale)?;
        let plan = ledger.check_and_reserve(&new_sale.target, new_sale.quantity)?;
        let metrics = compute_metrics(ledger, &new_sale)?;
        ledger.apply(plan)?;

        let sequence = self.sales.len() as u64 + 1;
        let sale = new_sale.into_sale(sequence, metrics);

        info!(
            sequence,
            order_number = %sale.order_number,
            target = %sale.target,
            quantity = sale.quantity,
            total = %sale.metrics.total_sale_price,
            "Sale recorded"
        );

        self.sales.push(sale);
        Ok(&self.sales[self.sales.len() - 1])
    }

    /// Computes the metrics a sale would get, without checking stock or
    /// recording anything.
    pub fn preview(&self, ledger: &StockLedger, new_sale: &NewSale) -> LedgerResult<SaleMetrics> {
        if new_sale.quantity <= 0 {
            return Err(LedgerError::invalid_quantity("quantity sold", new_sale.quantity));
        }
        validate_new_sale(new_sale)?;
        compute_metrics(ledger, new_sale)
    }

    /// Sales matching `filter`, lazily, in insertion order.
    pub fn query<'a>(&'a self, filter: &'a SaleFilter) -> SaleQuery<'a> {
        SaleQuery {
            sales: self.sales.iter(),
            filter,
        }
    }

    pub fn summary(&self, filter: &SaleFilter) -> LedgerResult<SalesSummary> {
        SalesSummary::from_sales(self.query(filter))
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}

fn compute_metrics(ledger: &StockLedger, new_sale: &NewSale) -> LedgerResult<SaleMetrics> {
    let unit_cost = ledger.unit_cost(&new_sale.target)?;
    let metrics = SaleMetrics::compute(
        new_sale.quantity,
        new_sale.unit_price,
        new_sale.additional_fees,
        new_sale.shipping_fees,
        unit_cost,
    )?;
    debug!(target = %new_sale.target, unit_cost = %unit_cost, "Sale metrics computed");
    Ok(metrics)
}

fn validate_new_sale(new_sale: &NewSale) -> ValidationResult<()> {
    validate_text("order number", &new_sale.order_number)?;
    validate_text("buyer", &new_sale.buyer)?;
    validate_text("comment", &new_sale.comment)?;
    validate_amount("unit price", new_sale.unit_price)?;
    validate_amount("additional fees", new_sale.additional_fees)?;
    validate_amount("shipping fees", new_sale.shipping_fees)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LedgerError, Shortage};
    use crate::types::{KitComponent, SaleTarget};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stocked_ledger() -> StockLedger {
        let mut ledger = StockLedger::new();
        ledger
            .register_product("A1", "Savon", 10, Money::from_cents(500), None)
            .unwrap();
        ledger
            .register_product("A2", "Bougie", 2, Money::from_cents(300), None)
            .unwrap();
        ledger
    }

    fn sale_on(target: SaleTarget, qty: i64, day: NaiveDate) -> NewSale {
        NewSale::new("CMD", target, qty, Money::from_cents(800), day)
    }

    #[test]
    fn test_record_product_sale_end_to_end() {
        let mut ledger = stocked_ledger();
        let mut journal = SalesJournal::new();

        let sale = journal
            .record_sale(&mut ledger, sale_on(SaleTarget::product("A1"), 3, date(2024, 3, 1)))
            .unwrap();

        assert_eq!(sale.sequence, 1);
        assert_eq!(sale.metrics.total_sale_price.cents(), 2400);
        assert_eq!(sale.metrics.total_cost.cents(), 1500);
        assert_eq!(sale.metrics.net_profit.cents(), 900);
        assert_eq!(sale.metrics.net_margin.bps(), 3750);
        assert_eq!(ledger.product("A1").unwrap().remaining_quantity(), 7);
    }

    #[test]
    fn test_margin_clamp_for_free_sale() {
        let mut ledger = stocked_ledger();
        let mut journal = SalesJournal::new();

        let free = NewSale::new("CMD", SaleTarget::product("A1"), 2, Money::zero(), date(2024, 3, 1));
        let sale = journal.record_sale(&mut ledger, free).unwrap();

        assert_eq!(sale.metrics.total_sale_price, Money::zero());
        assert_eq!(sale.metrics.net_margin, Percent::zero());
        assert_eq!(sale.metrics.net_margin.percentage(), 0.0);
    }

    #[test]
    fn test_rejected_sale_propagates_ledger_error_untouched() {
        let mut ledger = stocked_ledger();
        ledger
            .compose_kit(
                "K1",
                vec![KitComponent::new("A1", 2), KitComponent::new("A2", 3)],
                None,
            )
            .unwrap();
        let mut journal = SalesJournal::new();

        let err = journal
            .record_sale(&mut ledger, sale_on(SaleTarget::kit("K1"), 1, date(2024, 3, 1)))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientStock(crate::error::Shortages(vec![Shortage::new(
                "A2", 2, 3
            )]))
        );
        assert!(journal.is_empty());
        assert_eq!(ledger.product("A1").unwrap().remaining_quantity(), 10);
        assert_eq!(ledger.product("A2").unwrap().remaining_quantity(), 2);
    }

    #[test]
    fn test_kit_sale_uses_component_cost() {
        let mut ledger = stocked_ledger();
        ledger
            .compose_kit(
                "K1",
                vec![KitComponent::new("A1", 1), KitComponent::new("A2", 1)],
                None,
            )
            .unwrap();
        let mut journal = SalesJournal::new();

        let new_sale = NewSale::new("CMD", SaleTarget::kit("K1"), 2, Money::from_cents(1500), date(2024, 3, 1))
            .shipping_fees(Money::from_cents(400));
        let sale = journal.record_sale(&mut ledger, new_sale).unwrap();

        // 2 × 15.00 − 4.00 = 26.00; cost 2 × (5.00 + 3.00) = 16.00
        assert_eq!(sale.metrics.total_sale_price.cents(), 2600);
        assert_eq!(sale.metrics.total_cost.cents(), 1600);
        assert_eq!(sale.metrics.net_profit.cents(), 1000);
        assert_eq!(sale.metrics.net_margin.bps(), 3846);
        assert_eq!(ledger.product("A2").unwrap().remaining_quantity(), 0);
    }

    #[test]
    fn test_negative_fees_are_rejected_before_stock_moves() {
        let mut ledger = stocked_ledger();
        let mut journal = SalesJournal::new();

        let bad = sale_on(SaleTarget::product("A1"), 1, date(2024, 3, 1))
            .additional_fees(Money::from_cents(-1));
        let err = journal.record_sale(&mut ledger, bad).unwrap_err();

        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.product("A1").unwrap().remaining_quantity(), 10);
    }

    #[test]
    fn test_preview_does_not_touch_stock() {
        let ledger = stocked_ledger();
        let journal = SalesJournal::new();

        let metrics = journal
            .preview(&ledger, &sale_on(SaleTarget::product("A2"), 50, date(2024, 3, 1)))
            .unwrap();

        assert_eq!(metrics.total_sale_price.cents(), 40_000);
        assert_eq!(ledger.product("A2").unwrap().remaining_quantity(), 2);
        assert!(journal.is_empty());
    }

    #[test]
    fn test_huge_quantity_reports_shortage_not_overflow() {
        let mut ledger = stocked_ledger();
        let mut journal = SalesJournal::new();
        let huge = i64::MAX / 100;

        let err = journal
            .record_sale(&mut ledger, sale_on(SaleTarget::product("A1"), huge, date(2024, 3, 1)))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientStock(crate::error::Shortages(vec![Shortage::new("A1", 10, huge)]))
        );
        assert!(journal.is_empty());
        assert_eq!(ledger.product("A1").unwrap().remaining_quantity(), 10);

        let err = journal
            .preview(&ledger, &sale_on(SaleTarget::product("A1"), huge, date(2024, 3, 1)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AmountOverflow(_)));
    }

    #[test]
    fn test_query_by_date_range_is_ordered_and_repeatable() {
        let mut ledger = stocked_ledger();
        let mut journal = SalesJournal::new();
        for day in [5, 20, 1, 15] {
            journal
                .record_sale(&mut ledger, sale_on(SaleTarget::product("A1"), 1, date(2024, 6, day)))
                .unwrap();
        }

        let filter = SaleFilter::all()
            .date_range(DateRange::new(date(2024, 6, 5), date(2024, 6, 15)).unwrap());

        let first: Vec<u64> = journal.query(&filter).map(|s| s.sequence).collect();
        let second: Vec<u64> = journal.query(&filter).map(|s| s.sequence).collect();

        assert_eq!(first, vec![1, 4]);
        assert_eq!(first, second);

        let query = journal.query(&filter);
        let restarted = query.clone();
        assert_eq!(query.count(), restarted.count());
    }

    #[test]
    fn test_query_filters_are_conjunctive() {
        let mut ledger = stocked_ledger();
        let mut journal = SalesJournal::new();
        let day = date(2024, 6, 1);

        let entries = [
            (Carrier::Colissimo, Platform::Vinted),
            (Carrier::Ups, Platform::Vinted),
            (Carrier::Colissimo, Platform::Amazon),
            (Carrier::LaPoste, Platform::Other),
        ];
        for (carrier, platform) in entries {
            let new_sale = sale_on(SaleTarget::product("A1"), 1, day)
                .carrier(carrier)
                .platform(platform);
            journal.record_sale(&mut ledger, new_sale).unwrap();
        }

        let colissimo = SaleFilter::all().carriers([Carrier::Colissimo]);
        let seqs: Vec<u64> = journal.query(&colissimo).map(|s| s.sequence).collect();
        assert_eq!(seqs, vec![1, 3]);

        let colissimo_vinted = SaleFilter::all()
            .carriers([Carrier::Colissimo])
            .platforms([Platform::Vinted]);
        let seqs: Vec<u64> = journal.query(&colissimo_vinted).map(|s| s.sequence).collect();
        assert_eq!(seqs, vec![1]);

        let two_carriers = SaleFilter::all().carriers([Carrier::Ups, Carrier::LaPoste]);
        assert_eq!(journal.query(&two_carriers).count(), 2);

        let out_of_range = SaleFilter::all()
            .date_range(DateRange::new(date(2025, 1, 1), date(2025, 12, 31)).unwrap());
        assert_eq!(journal.query(&out_of_range).count(), 0);
    }

    #[test]
    fn test_summary() {
        let mut ledger = stocked_ledger();
        let mut journal = SalesJournal::new();
        journal
            .record_sale(&mut ledger, sale_on(SaleTarget::product("A1"), 3, date(2024, 3, 1)))
            .unwrap();
        journal
            .record_sale(&mut ledger, sale_on(SaleTarget::product("A2"), 1, date(2024, 3, 2)))
            .unwrap();

        let summary = journal.summary(&SaleFilter::all()).unwrap();
        assert_eq!(summary.sales, 2);
        assert_eq!(summary.units, 4);
        assert_eq!(summary.revenue.cents(), 3200);
        assert_eq!(summary.cost.cents(), 1800);
        assert_eq!(summary.profit.cents(), 1400);
        assert_eq!(summary.margin.bps(), 4375);
    }

    #[test]
    fn test_restore_renumbers() {
        let mut ledger = stocked_ledger();
        let mut journal = SalesJournal::new();
        journal
            .record_sale(&mut ledger, sale_on(SaleTarget::product("A1"), 1, date(2024, 3, 1)))
            .unwrap();
        let mut sale = journal.sales()[0].clone();
        sale.sequence = 42;

        let restored = SalesJournal::restore(vec![sale.clone(), sale]);
        let seqs: Vec<u64> = restored.sales().iter().map(|s| s.sequence).collect();
        assert_eq!(seqs, vec![1, 2]);
    }
}
