//! # Dashboard
//!
//! ```text
//! Stock ──────────────── one line per product, image status flagged
//! Sold out ───────────── SKUs with nothing left
//! Kits ───────────────── composition with product names
//! Sales ──────────────── summary over the filtered history
//! ```

use std::io::Write;
use std::path::Path;

use stockbook_core::{Dashboard, SaleFilter, StockLine};
use stockbook_store::Session;

use crate::error::CliError;

/// How a product's image reference checks out on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Present,
    NoReference,
    FileNotFound,
}

impl ImageStatus {
    pub fn of(line: &StockLine) -> Self {
        match line.image_ref.as_deref().map(str::trim) {
            None | Some("") => ImageStatus::NoReference,
            Some(reference) if Path::new(reference).exists() => ImageStatus::Present,
            Some(_) => ImageStatus::FileNotFound,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ImageStatus::Present => "ok",
            ImageStatus::NoReference => "missing",
            ImageStatus::FileNotFound => "file not found",
        }
    }
}

pub fn show<W: Write>(
    session: &Session,
    filter: &SaleFilter,
    json: bool,
    out: &mut W,
) -> Result<(), CliError> {
    let dashboard = Dashboard::build(session.catalog(), filter)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &dashboard)?;
        writeln!(out)?;
        return Ok(());
    }

    write_stock(&dashboard, out)?;
    write_kits(&dashboard, out)?;

    let sales = &dashboard.sales;
    writeln!(out)?;
    writeln!(out, "Sales")?;
    writeln!(out, "  {} sales, {} units", sales.sales, sales.units)?;
    writeln!(out, "  Revenue: {}", sales.revenue)?;
    writeln!(out, "  Cost:    {}", sales.cost)?;
    writeln!(out, "  Profit:  {} ({})", sales.profit, sales.margin)?;
    Ok(())
}

fn write_stock<W: Write>(dashboard: &Dashboard, out: &mut W) -> Result<(), CliError> {
    let stock = &dashboard.stock;
    writeln!(out, "Stock")?;
    if stock.lines.is_empty() {
        writeln!(out, "  No products yet.")?;
        return Ok(());
    }

    for line in &stock.lines {
        writeln!(
            out,
            "  {:<16} {:<32} {:>11} {:>12}  image: {}",
            line.sku,
            line.name,
            format!("{}/{}", line.remaining_quantity, line.initial_quantity),
            line.unit_price.to_string(),
            ImageStatus::of(line).label()
        )?;
    }
    writeln!(out, "  Stock value: {}", stock.stock_value)?;

    let sold_out: Vec<&str> = stock.sold_out().collect();
    if !sold_out.is_empty() {
        writeln!(out, "  Sold out: {}", sold_out.join(", "))?;
    }
    Ok(())
}

fn write_kits<W: Write>(dashboard: &Dashboard, out: &mut W) -> Result<(), CliError> {
    if dashboard.kits.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Kits")?;
    for kit in &dashboard.kits {
        match &kit.image_ref {
            Some(image) => writeln!(out, "  {} ({})", kit.name, image)?,
            None => writeln!(out, "  {}", kit.name)?,
        }
        for component in &kit.components {
            writeln!(out, "    {} × {} {}", component.quantity, component.sku, component.product_name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockbook_core::{KitComponent, Money, NewSale, SaleTarget};
    use stockbook_store::StoreConfig;

    fn line(image_ref: Option<&str>) -> StockLine {
        StockLine {
            sku: "A1".into(),
            name: "Savon".into(),
            initial_quantity: 1,
            remaining_quantity: 1,
            unit_price: Money::zero(),
            image_ref: image_ref.map(str::to_string),
        }
    }

    #[test]
    fn test_image_status() {
        let existing = std::env::temp_dir();
        let existing = existing.to_string_lossy();

        assert_eq!(ImageStatus::of(&line(None)), ImageStatus::NoReference);
        assert_eq!(ImageStatus::of(&line(Some("  "))), ImageStatus::NoReference);
        assert_eq!(
            ImageStatus::of(&line(Some("/nonexistent/stockbook/a1.png"))),
            ImageStatus::FileNotFound
        );
        assert_eq!(ImageStatus::of(&line(Some(&existing))), ImageStatus::Present);
    }

    async fn session() -> Session {
        let mut session = Session::open(StoreConfig::in_memory()).await.unwrap();
        session
            .register_product("A1", "Savon", 2, Money::from_cents(500), None)
            .await
            .unwrap();
        session
            .register_product("A2", "Bougie", 4, Money::from_cents(300), Some("/nonexistent/a2.png".into()))
            .await
            .unwrap();
        session
            .compose_kit("K1", vec![KitComponent::new("A1", 1), KitComponent::new("A2", 2)], None)
            .await
            .unwrap();
        session
            .record_sale(NewSale::new(
                "CMD-1",
                SaleTarget::kit("K1"),
                2,
                Money::from_cents(2000),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ))
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_text_dashboard() {
        let session = session().await;
        let mut out = Vec::new();

        show(&session, &SaleFilter::all(), false, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("image: missing"));
        assert!(text.contains("image: file not found"));
        assert!(text.contains("Sold out: A1"));
        assert!(text.contains("    2 × A2 Bougie"));
        assert!(text.contains("1 sales, 2 units"));
        // 2 × 20.00 = 40.00, cost 2 × (5.00 + 2 × 3.00) = 22.00
        assert!(text.contains("Revenue: 40.00 €"));
        assert!(text.contains("Profit:  18.00 € (45.00 %)"));
    }

    #[tokio::test]
    async fn test_json_dashboard() {
        let session = session().await;
        let mut out = Vec::new();

        show(&session, &SaleFilter::all(), true, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["stock"]["lines"].as_array().unwrap().len(), 2);
        assert_eq!(value["kits"][0]["name"], "K1");
        assert_eq!(value["sales"]["units"], 2);
    }
}
