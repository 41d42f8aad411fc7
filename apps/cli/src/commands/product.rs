//! # Product Commands

use std::io::Write;

use stockbook_core::{Money, StockOverview};
use stockbook_store::Session;
use tracing::info;

use crate::error::CliError;

pub async fn add<W: Write>(
    session: &mut Session,
    sku: &str,
    name: &str,
    quantity: i64,
    price: Money,
    image: Option<String>,
    out: &mut W,
) -> Result<(), CliError> {
    let product = session
        .register_product(sku, name, quantity, price, image)
        .await?;

    info!(sku = %product.sku(), "Product registered");
    writeln!(
        out,
        "Registered {} ({}): {} in stock at {}",
        product.sku(),
        product.name(),
        product.remaining_quantity(),
        product.unit_price()
    )?;
    Ok(())
}

pub fn list<W: Write>(session: &Session, out: &mut W) -> Result<(), CliError> {
    let overview = StockOverview::from_catalog(session.catalog())?;

    if overview.lines.is_empty() {
        writeln!(out, "No products yet.")?;
        return Ok(());
    }

    writeln!(out, "{:<16} {:<32} {:>11} {:>12}  IMAGE", "SKU", "NAME", "LEFT/INIT", "PRICE")?;
    for line in &overview.lines {
        writeln!(
            out,
            "{:<16} {:<32} {:>11} {:>12}  {}",
            line.sku,
            line.name,
            format!("{}/{}", line.remaining_quantity, line.initial_quantity),
            line.unit_price.to_string(),
            line.image_ref.as_deref().unwrap_or("-")
        )?;
    }
    writeln!(out, "Stock value: {}", overview.stock_value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_store::StoreConfig;

    #[tokio::test]
    async fn test_add_then_list() {
        let mut session = Session::open(StoreConfig::in_memory()).await.unwrap();
        let mut out = Vec::new();

        add(&mut session, "A1", "Savon", 10, Money::from_cents(500), None, &mut out)
            .await
            .unwrap();
        list(&session, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Registered A1 (Savon): 10 in stock at 5.00 €"));
        assert!(text.contains("10/10"));
        assert!(text.contains("Stock value: 50.00 €"));
    }

    #[tokio::test]
    async fn test_duplicate_is_reported_as_ledger_error() {
        let mut session = Session::open(StoreConfig::in_memory()).await.unwrap();
        let mut out = Vec::new();

        add(&mut session, "A1", "Savon", 1, Money::zero(), None, &mut out)
            .await
            .unwrap();
        let err = add(&mut session, "A1", "Autre", 1, Money::zero(), None, &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.message(), "a product with SKU 'A1' already exists");
    }
}
