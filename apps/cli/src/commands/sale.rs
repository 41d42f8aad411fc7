//! # Sale Commands
//!
//! ```text
//! sale record ──► NewSale ──► --preview? ──yes──► print metrics, store untouched
//!                                 │ no
//!                                 ▼
//!                       session.record_sale ──► print recorded sale
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use stockbook_core::{NewSale, SaleFilter, SaleMetrics};
use stockbook_store::{write_sales_csv, Session};
use tracing::info;

use crate::cli::RecordArgs;
use crate::error::CliError;

pub fn new_sale(args: &RecordArgs, today: NaiveDate) -> Result<NewSale, CliError> {
    let mut sale = NewSale::new(
        args.order.clone(),
        args.target()?,
        args.quantity,
        args.price,
        args.date.unwrap_or(today),
    )
    .additional_fees(args.fees)
    .shipping_fees(args.shipping_fees)
    .carrier(args.carrier)
    .platform(args.platform)
    .buyer(args.buyer.clone())
    .comment(args.comment.clone());

    if let Some(date) = args.shipped {
        sale = sale.shipping_date(date);
    }
    if let Some(date) = args.delivered {
        sale = sale.delivery_date(date);
    }
    Ok(sale)
}

pub async fn record<W: Write>(
    session: &mut Session,
    args: &RecordArgs,
    today: NaiveDate,
    out: &mut W,
) -> Result<(), CliError> {
    let new_sale = new_sale(args, today)?;

    if args.preview {
        let metrics = session.preview_sale(&new_sale)?;
        writeln!(out, "Preview of {} × {} (not recorded)", new_sale.quantity, new_sale.target)?;
        write_metrics(out, &metrics)?;
        return Ok(());
    }

    let sale = session.record_sale(new_sale).await?;
    info!(sequence = sale.sequence, "Sale saved");

    writeln!(
        out,
        "Recorded sale #{} ({}): {} × {}",
        sale.sequence, sale.order_number, sale.quantity, sale.target
    )?;
    write_metrics(out, &sale.metrics)?;
    Ok(())
}

fn write_metrics<W: Write>(out: &mut W, metrics: &SaleMetrics) -> Result<(), CliError> {
    writeln!(out, "  Total sale price: {}", metrics.total_sale_price)?;
    writeln!(out, "  Total cost:       {}", metrics.total_cost)?;
    writeln!(out, "  Net profit:       {}", metrics.net_profit)?;
    writeln!(out, "  Net margin:       {}", metrics.net_margin)?;
    Ok(())
}

pub fn list<W: Write>(session: &Session, filter: &SaleFilter, out: &mut W) -> Result<(), CliError> {
    let mut any = false;
    for sale in session.query(filter) {
        if !any {
            writeln!(
                out,
                "{:>4}  {:<10}  {:<14} {:<20} {:>4} {:>12} {:>12}  {:<13} {}",
                "#", "DATE", "ORDER", "TARGET", "QTY", "TOTAL", "PROFIT", "CARRIER", "PLATFORM"
            )?;
            any = true;
        }
        writeln!(
            out,
            "{:>4}  {:<10}  {:<14} {:<20} {:>4} {:>12} {:>12}  {:<13} {}",
            sale.sequence,
            sale.entry_date.to_string(),
            sale.order_number,
            sale.target.to_string(),
            sale.quantity,
            sale.metrics.total_sale_price.to_string(),
            sale.metrics.net_profit.to_string(),
            sale.carrier.label(),
            sale.platform.label()
        )?;
    }

    if !any {
        writeln!(out, "No matching sales.")?;
        return Ok(());
    }

    let summary = session.summary(filter)?;
    writeln!(
        out,
        "{} sales, {} units, revenue {}, cost {}, profit {} ({})",
        summary.sales, summary.units, summary.revenue, summary.cost, summary.profit, summary.margin
    )?;
    Ok(())
}

/// Writes the filtered sales as CSV to `path`, or to `out` when no path is
/// given.
pub fn export<W: Write>(
    session: &Session,
    filter: &SaleFilter,
    path: Option<&Path>,
    out: &mut W,
) -> Result<(), CliError> {
    match path {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            let rows = write_sales_csv(file, session.query(filter))?;
            writeln!(out, "Exported {} sales to {}", rows, path.display())?;
        }
        None => {
            write_sales_csv(&mut *out, session.query(filter))?;
        }
    }
    Ok(())
}
