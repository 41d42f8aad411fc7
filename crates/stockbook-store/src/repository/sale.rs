//! # Sale Repository
//!
//! Load and replace the `sales` table.
//!
//! ## Derived Metrics on Load
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales row                                                              │
//! │    quantity, unit_price, fees ...     total │ cost │ profit │ margin   │
//! │                                                                         │
//! │  all four metric columns set?   ──yes──►  used as stored                │
//! │           │ no (store predates 002_sale_metrics)                        │
//! │           ▼                                                             │
//! │  SaleMetrics::compute(row fields, ledger.unit_cost(target))            │
//! │  (unit cost 0 if the target is gone from the catalog)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use stockbook_core::{Money, Percent, Sale, SaleMetrics, SaleTarget, StockLedger, TargetKind};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    sequence: i64,
    order_number: String,
    target_kind: TargetKind,
    target_name: String,
    quantity: i64,
    unit_price_cents: i64,
    additional_fees_cents: i64,
    shipping_fees_cents: i64,
    carrier: String,
    buyer: String,
    comment: String,
    platform: String,
    entry_date: NaiveDate,
    shipping_date: Option<NaiveDate>,
    delivery_date: Option<NaiveDate>,
    total_sale_price_cents: Option<i64>,
    total_cost_cents: Option<i64>,
    net_profit_cents: Option<i64>,
    net_margin_bps: Option<i64>,
}

impl SaleRow {
    fn into_sale(self, ledger: &StockLedger) -> StoreResult<Sale> {
        let target = SaleTarget::from_parts(self.target_kind, self.target_name);
        let unit_price = Money::from_cents(self.unit_price_cents);
        let additional_fees = Money::from_cents(self.additional_fees_cents);
        let shipping_fees = Money::from_cents(self.shipping_fees_cents);

        let metrics = match (
            self.total_sale_price_cents,
            self.total_cost_cents,
            self.net_profit_cents,
            self.net_margin_bps,
        ) {
            (Some(total), Some(cost), Some(profit), Some(margin)) => SaleMetrics {
                total_sale_price: Money::from_cents(total),
                total_cost: Money::from_cents(cost),
                net_profit: Money::from_cents(profit),
                net_margin: Percent::from_bps(margin),
            },
            _ => {
                let unit_cost = ledger.unit_cost(&target).unwrap_or_else(|err| {
                    warn!(
                        sequence = self.sequence,
                        target = %target,
                        error = %err,
                        "Cannot price sale target, recomputing metrics with zero cost"
                    );
                    Money::zero()
                });
                debug!(sequence = self.sequence, "Recomputing missing sale metrics");
                SaleMetrics::compute(self.quantity, unit_price, additional_fees, shipping_fees, unit_cost)
                    .map_err(|e| StoreError::invalid_row("sales", e))?
            }
        };

        Ok(Sale {
            sequence: self.sequence.max(0) as u64,
            order_number: self.order_number,
            target,
            quantity: self.quantity,
            unit_price,
            additional_fees,
            shipping_fees,
            carrier: parse_or_other(&self.carrier, "carrier"),
            buyer: self.buyer,
            comment: self.comment,
            platform: parse_or_other(&self.platform, "platform"),
            entry_date: self.entry_date,
            shipping_date: self.shipping_date,
            delivery_date: self.delivery_date,
            metrics,
        })
    }
}

/// Carrier and platform columns may hold free text in older stores.
fn parse_or_other<T>(raw: &str, column: &'static str) -> T
where
    T: std::str::FromStr + Default,
{
    raw.parse().unwrap_or_else(|_| {
        warn!(column, value = %raw, "Unknown value, using Other");
        T::default()
    })
}

/// Repository for the `sales` table.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Every sale, in recording order.
    ///
    /// `ledger` prices sales whose metric columns are NULL.
    pub async fn load_all(&self, ledger: &StockLedger) -> StoreResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT sequence, order_number, target_kind, target_name, quantity,
                   unit_price_cents, additional_fees_cents, shipping_fees_cents,
                   carrier, buyer, comment, platform,
                   entry_date, shipping_date, delivery_date,
                   total_sale_price_cents, total_cost_cents,
                   net_profit_cents, net_margin_bps
            FROM sales
            ORDER BY sequence
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded sales");
        rows.into_iter().map(|row| row.into_sale(ledger)).collect()
    }

    pub(crate) async fn replace_all(conn: &mut SqliteConnection, sales: &[Sale]) -> StoreResult<()> {
        sqlx::query("DELETE FROM sales").execute(&mut *conn).await?;

        for sale in sales {
            sqlx::query(
                r#"
                INSERT INTO sales (
                    sequence, order_number, target_kind, target_name, quantity,
                    unit_price_cents, additional_fees_cents, shipping_fees_cents,
                    carrier, buyer, comment, platform,
                    entry_date, shipping_date, delivery_date,
                    total_sale_price_cents, total_cost_cents,
                    net_profit_cents, net_margin_bps
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19
                )
                "#,
            )
            .bind(sale.sequence as i64)
            .bind(&sale.order_number)
            .bind(sale.target.kind())
            .bind(sale.target.key())
            .bind(sale.quantity)
            .bind(sale.unit_price.cents())
            .bind(sale.additional_fees.cents())
            .bind(sale.shipping_fees.cents())
            .bind(sale.carrier)
            .bind(&sale.buyer)
            .bind(&sale.comment)
            .bind(sale.platform)
            .bind(sale.entry_date)
            .bind(sale.shipping_date)
            .bind(sale.delivery_date)
            .bind(sale.metrics.total_sale_price.cents())
            .bind(sale.metrics.total_cost.cents())
            .bind(sale.metrics.net_profit.cents())
            .bind(sale.metrics.net_margin.bps())
            .execute(&mut *conn)
            .await?;
        }

        debug!(count = sales.len(), "Saved sales");
        Ok(())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
