//! # Seed Data Generator
//!
//! Populates a store with demo products, kits and sales for development.
//!
//! ## Usage
//! ```bash
//! # 40 products, 60 sales (default) into ./stockbook_dev.db
//! cargo run -p stockbook-store --bin seed
//!
//! # Custom amounts and path
//! cargo run -p stockbook-store --bin seed -- --count 100 --sales 500 --db ./data/demo.db
//! ```
//!
//! Each product gets a SKU `{CATEGORY}-{NNN}`, a price between 2.00 and
//! 11.99 and a stock between 5 and 54. One kit is composed per category.
//! Sales are spread over the first quarter of 2024 across every carrier
//! and platform; a sale that would run out of stock is skipped.

use chrono::{Duration, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use stockbook_core::{Carrier, KitComponent, Money, NewSale, Platform, SaleFilter, SaleTarget};
use stockbook_store::{Session, StoreConfig};

/// Product categories for demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "SAV",
        &["Savon lavande", "Savon miel", "Savon argile", "Savon karité", "Savon menthe"],
    ),
    (
        "BOU",
        &["Bougie vanille", "Bougie figue", "Bougie cèdre", "Bougie ambre"],
    ),
    (
        "BIJ",
        &["Bracelet perles", "Collier lune", "Boucles dorées", "Bague fine"],
    ),
    (
        "PAP",
        &["Carnet A5", "Carte postale", "Marque-page", "Stickers"],
    ),
];

/// Stockbook seed data generator.
#[derive(Debug, Parser)]
#[command(name = "seed", about = "Populate a store with demo products, kits and sales")]
struct SeedArgs {
    /// Number of products to generate.
    #[arg(short, long, default_value_t = 40)]
    count: usize,

    /// Number of sales to attempt.
    #[arg(short, long, default_value_t = 60)]
    sales: usize,

    /// Store file path.
    #[arg(short, long, default_value = "./stockbook_dev.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let SeedArgs { count, sales, db } = SeedArgs::parse();

    println!("Stockbook Seed Data Generator");
    println!("=============================");
    println!("Store:    {}", db.display());
    println!("Products: {}", count);
    println!("Sales:    {}", sales);
    println!();

    let mut session = Session::open(StoreConfig::new(db)).await?;
    println!("✓ Store opened");

    let existing = session.store().products().count().await?;
    if existing > 0 {
        println!("⚠ Store already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the store file to regenerate.");
        return Ok(());
    }

    // Products
    let mut skus: Vec<String> = Vec::with_capacity(count);
    let mut per_category: Vec<Vec<String>> = vec![Vec::new(); CATEGORIES.len()];
    'outer: for round in 0.. {
        for (category_idx, (code, names)) in CATEGORIES.iter().enumerate() {
            if skus.len() >= count {
                break 'outer;
            }
            let name = names[round % names.len()];
            let seed = skus.len();
            let sku = format!("{}-{:03}", code, seed);
            let price = Money::from_cents(200 + ((seed * 37) % 1000) as i64);
            let stock = 5 + (seed % 50) as i64;
            let image = (seed % 4 != 0).then(|| format!("images/{}.png", sku.to_lowercase()));

            session
                .register_product(&sku, &format!("{} #{}", name, round + 1), stock, price, image)
                .await?;
            per_category[category_idx].push(sku.clone());
            skus.push(sku);
        }
    }
    println!("✓ Generated {} products", skus.len());

    // One kit per category, from its first two products
    let mut kits: Vec<String> = Vec::new();
    for ((code, _), members) in CATEGORIES.iter().zip(&per_category) {
        if members.len() < 2 {
            continue;
        }
        let name = format!("Coffret {}", code);
        session
            .compose_kit(
                &name,
                vec![KitComponent::new(&members[0], 1), KitComponent::new(&members[1], 2)],
                None,
            )
            .await?;
        kits.push(name);
    }
    println!("✓ Composed {} kits", kits.len());

    // Sales
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let mut recorded = 0;
    let mut skipped = 0;
    for n in 0..sales {
        if skus.is_empty() {
            break;
        }
        let target = if n % 5 == 4 && !kits.is_empty() {
            SaleTarget::kit(kits[n % kits.len()].clone())
        } else {
            SaleTarget::product(skus[(n * 7) % skus.len()].clone())
        };
        let entry_date = start + Duration::days((n % 90) as i64);
        let new_sale = NewSale::new(
            format!("CMD-{:05}", n + 1),
            target,
            1 + (n % 3) as i64,
            Money::from_cents(900 + ((n * 53) % 2000) as i64),
            entry_date,
        )
        .additional_fees(Money::from_cents(((n * 11) % 150) as i64))
        .shipping_fees(Money::from_cents(((n * 13) % 600) as i64))
        .carrier(Carrier::ALL[n % Carrier::ALL.len()])
        .platform(Platform::ALL[n % Platform::ALL.len()])
        .buyer(format!("Client {}", n % 17))
        .shipping_date(entry_date + Duration::days(1));

        match session.record_sale(new_sale).await {
            Ok(_) => recorded += 1,
            Err(err) if err.as_ledger().is_some() => skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }
    println!("✓ Recorded {} sales ({} skipped for stock)", recorded, skipped);

    let summary = session.summary(&SaleFilter::all())?;
    println!();
    println!("Revenue: {}", summary.revenue);
    println!("Profit:  {} ({})", summary.profit, summary.margin);
    println!("✓ Seed complete!");

    session.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = SeedArgs::try_parse_from(["seed"]).unwrap();
        assert_eq!(args.count, 40);
        assert_eq!(args.sales, 60);
        assert_eq!(args.db, PathBuf::from("./stockbook_dev.db"));
    }

    #[test]
    fn test_args_short_flags() {
        let args = SeedArgs::try_parse_from(["seed", "-c", "5", "-d", "demo.db"]).unwrap();
        assert_eq!(args.count, 5);
        assert_eq!(args.sales, 60);
        assert_eq!(args.db, PathBuf::from("demo.db"));
        assert!(SeedArgs::try_parse_from(["seed", "--count", "many"]).is_err());
    }
}
