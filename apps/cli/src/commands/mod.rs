//! # Command Handlers
//!
//! ```text
//! commands/
//! ├── mod.rs        ◄─── dispatch
//! ├── product.rs    ◄─── product add / list
//! ├── kit.rs        ◄─── kit add / list
//! ├── sale.rs       ◄─── sale record / list / export
//! └── dashboard.rs  ◄─── stock overview + kits + sales summary
//! ```
//!
//! Handlers write to any `io::Write`, so tests capture output in a `Vec<u8>`.

use std::io::Write;

use chrono::NaiveDate;
use stockbook_store::Session;

use crate::cli::{Command, KitCommand, ProductCommand, SaleCommand};
use crate::error::CliError;

pub mod dashboard;
pub mod kit;
pub mod product;
pub mod sale;

/// Runs one parsed command against an open session.
///
/// `today` is the default entry date for new sales.
pub async fn dispatch<W: Write>(
    session: &mut Session,
    command: Command,
    today: NaiveDate,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        Command::Product(ProductCommand::Add {
            sku,
            name,
            quantity,
            price,
            image,
        }) => product::add(session, &sku, &name, quantity, price, image, out).await,
        Command::Product(ProductCommand::List) => product::list(session, out),

        Command::Kit(KitCommand::Add {
            name,
            components,
            image,
        }) => kit::add(session, &name, components, image, out).await,
        Command::Kit(KitCommand::List) => kit::list(session, out),

        Command::Sale(SaleCommand::Record(args)) => sale::record(session, &args, today, out).await,
        Command::Sale(SaleCommand::List { filter }) => sale::list(session, &filter.to_filter()?, out),
        Command::Sale(SaleCommand::Export { filter, out: path }) => {
            sale::export(session, &filter.to_filter()?, path.as_deref(), out)
        }

        Command::Dashboard { filter, json } => dashboard::show(session, &filter.to_filter()?, json, out),
    }
}
