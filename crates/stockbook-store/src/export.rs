//! # Sales Export
//!
//! Writes sales as CSV, one row per sale, with the derived metric columns.
//! Amounts use the plain decimal form (`24.00`), dates ISO 8601.

use serde::Serialize;
use std::io;
use tracing::info;

use crate::error::StoreResult;
use stockbook_core::{Sale, TargetKind};

#[derive(Debug, Serialize)]
struct SaleRecord<'a> {
    sequence: u64,
    order_number: &'a str,
    target_kind: &'static str,
    target: &'a str,
    quantity: i64,
    unit_price: String,
    additional_fees: String,
    shipping_fees: String,
    total_sale_price: String,
    total_cost: String,
    net_profit: String,
    net_margin_percent: String,
    carrier: &'static str,
    platform: &'static str,
    buyer: &'a str,
    comment: &'a str,
    entry_date: String,
    shipping_date: Option<String>,
    delivery_date: Option<String>,
}

impl<'a> From<&'a Sale> for SaleRecord<'a> {
    fn from(sale: &'a Sale) -> Self {
        SaleRecord {
            sequence: sale.sequence,
            order_number: &sale.order_number,
            target_kind: match sale.target.kind() {
                TargetKind::Product => "product",
                TargetKind::Kit => "kit",
            },
            target: sale.target.key(),
            quantity: sale.quantity,
            unit_price: sale.unit_price.to_decimal_string(),
            additional_fees: sale.additional_fees.to_decimal_string(),
            shipping_fees: sale.shipping_fees.to_decimal_string(),
            total_sale_price: sale.metrics.total_sale_price.to_decimal_string(),
            total_cost: sale.metrics.total_cost.to_decimal_string(),
            net_profit: sale.metrics.net_profit.to_decimal_string(),
            net_margin_percent: sale.metrics.net_margin.to_decimal_string(),
            carrier: sale.carrier.label(),
            platform: sale.platform.label(),
            buyer: &sale.buyer,
            comment: &sale.comment,
            entry_date: sale.entry_date.to_string(),
            shipping_date: sale.shipping_date.map(|d| d.to_string()),
            delivery_date: sale.delivery_date.map(|d| d.to_string()),
        }
    }
}

/// Writes `sales` as CSV with a header row. Returns the number of rows.
///
/// The header is written even when there are no sales.
pub fn write_sales_csv<'a, W: io::Write>(
    writer: W,
    sales: impl IntoIterator<Item = &'a Sale>,
) -> StoreResult<usize> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(HEADER)?;

    let mut written = 0;
    for sale in sales {
        wtr.serialize(SaleRecord::from(sale))?;
        written += 1;
    }
    wtr.flush()?;

    info!(rows = written, "Sales exported");
    Ok(written)
}

const HEADER: [&str; 19] = [
    "sequence",
    "order_number",
    "target_kind",
    "target",
    "quantity",
    "unit_price",
    "additional_fees",
    "shipping_fees",
    "total_sale_price",
    "total_cost",
    "net_profit",
    "net_margin_percent",
    "carrier",
    "platform",
    "buyer",
    "comment",
    "entry_date",
    "shipping_date",
    "delivery_date",
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockbook_core::{Carrier, Catalog, Money, NewSale, Platform, SaleFilter, SaleTarget};

    #[test]
    fn test_export_writes_header_and_metrics() {
        let mut catalog = Catalog::new();
        catalog
            .register_product("A1", "Savon", 10, Money::from_cents(500), None)
            .unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        catalog
            .record_sale(
                NewSale::new("CMD-1", SaleTarget::product("A1"), 3, Money::from_cents(800), day)
                    .carrier(Carrier::MondialRelay)
                    .platform(Platform::Vinted)
                    .buyer("Jeanne, Lyon"),
            )
            .unwrap();

        let mut out = Vec::new();
        let filter = SaleFilter::all();
        let rows = write_sales_csv(&mut out, catalog.query(&filter)).unwrap();
        assert_eq!(rows, 1);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("sequence,order_number,target_kind"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,CMD-1,product,A1,3,8.00,0.00,0.00,24.00,15.00,9.00,37.50,"));
        assert!(row.contains("\"Jeanne, Lyon\""));
        assert!(row.contains(",2024-03-01,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_export_of_nothing_is_header_only() {
        let mut out = Vec::new();
        let rows = write_sales_csv(&mut out, std::iter::empty()).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
