//! # Command Line Definition
//!
//! ```text
//! stockbook [--db PATH] <COMMAND>
//!
//!   product add <SKU> <NAME> --quantity N --price 5.00 [--image REF]
//!   product list
//!   kit add <NAME> --component SKU:QTY... [--image REF]
//!   kit list
//!   sale record --order ID (--product SKU | --kit NAME) --quantity N --price 8.00 [...]
//!   sale list   [--carrier C]... [--platform P]... [--from DATE] [--to DATE]
//!   sale export [filters] [--out FILE]
//!   dashboard   [filters] [--json]
//! ```

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::CliError;
use stockbook_core::{Carrier, DateRange, KitComponent, Money, Platform, SaleFilter, SaleTarget};

#[derive(Debug, Parser)]
#[command(name = "stockbook")]
#[command(about = "Stock and sales book for a small multi-marketplace shop")]
#[command(version)]
pub struct Cli {
    /// Store file (default: $STOCKBOOK_DB_PATH, then the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register and list products
    #[command(subcommand)]
    Product(ProductCommand),

    /// Compose and list kits
    #[command(subcommand)]
    Kit(KitCommand),

    /// Record, list and export sales
    #[command(subcommand)]
    Sale(SaleCommand),

    /// Stock overview, kits and sales summary
    Dashboard {
        #[command(flatten)]
        filter: FilterArgs,

        /// Print the dashboard as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    Add {
        sku: String,
        name: String,
        #[arg(long, short = 'q')]
        quantity: i64,
        /// Unit price, e.g. 5.00
        #[arg(long, short = 'p')]
        price: Money,
        /// Image reference stored as-is
        #[arg(long)]
        image: Option<String>,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum KitCommand {
    Add {
        name: String,
        /// Component as SKU:QTY, repeatable
        #[arg(long = "component", short = 'c', value_parser = parse_component, required = true)]
        components: Vec<KitComponent>,
        #[arg(long)]
        image: Option<String>,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    Record(RecordArgs),
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    #[arg(long)]
    pub order: String,

    #[arg(long, conflicts_with = "kit", required_unless_present = "kit")]
    pub product: Option<String>,

    #[arg(long)]
    pub kit: Option<String>,

    #[arg(long, short = 'q')]
    pub quantity: i64,

    /// Unit sale price, e.g. 8.00
    #[arg(long, short = 'p')]
    pub price: Money,

    #[arg(long, default_value = "0")]
    pub fees: Money,

    #[arg(long, default_value = "0")]
    pub shipping_fees: Money,

    #[arg(long, default_value = "other")]
    pub carrier: Carrier,

    #[arg(long, default_value = "other")]
    pub platform: Platform,

    #[arg(long, default_value = "")]
    pub buyer: String,

    #[arg(long, default_value = "")]
    pub comment: String,

    /// Entry date (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub shipped: Option<NaiveDate>,

    #[arg(long)]
    pub delivered: Option<NaiveDate>,

    /// Show the computed figures without recording
    #[arg(long, default_value_t = false)]
    pub preview: bool,
}

impl RecordArgs {
    pub fn target(&self) -> Result<SaleTarget, CliError> {
        match (&self.product, &self.kit) {
            (Some(sku), None) => Ok(SaleTarget::product(sku.clone())),
            (None, Some(name)) => Ok(SaleTarget::kit(name.clone())),
            _ => Err(CliError::usage("give exactly one of --product or --kit")),
        }
    }
}

/// Sale history filter. Empty carrier/platform lists mean "any".
///
/// `--to` before `--from` is rejected as a validation error rather than
/// matching nothing.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long = "carrier")]
    pub carriers: Vec<Carrier>,

    #[arg(long = "platform")]
    pub platforms: Vec<Platform>,

    /// First entry date included
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last entry date included; must not be before --from
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    /// An open-ended side of the range extends to the earliest or latest
    /// representable date.
    pub fn to_filter(&self) -> Result<SaleFilter, CliError> {
        let mut filter = SaleFilter::all()
            .carriers(self.carriers.iter().copied())
            .platforms(self.platforms.iter().copied());

        if self.from.is_some() || self.to.is_some() {
            let start = self.from.unwrap_or(NaiveDate::MIN);
            let end = self.to.unwrap_or(NaiveDate::MAX);
            filter = filter.date_range(DateRange::new(start, end)?);
        }
        Ok(filter)
    }
}

/// Parses `SKU:QTY`.
fn parse_component(raw: &str) -> Result<KitComponent, String> {
    let (sku, qty) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected SKU:QTY, got '{}'", raw))?;
    let quantity: i64 = qty
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole quantity", qty))?;
    Ok(KitComponent::new(sku.trim(), quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_product_add() {
        let cli = Cli::try_parse_from([
            "stockbook", "--db", "/tmp/x.db", "product", "add", "A1", "Savon", "-q", "10", "-p", "5.00",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        match cli.command {
            Command::Product(ProductCommand::Add { sku, quantity, price, image, .. }) => {
                assert_eq!(sku, "A1");
                assert_eq!(quantity, 10);
                assert_eq!(price, Money::from_cents(500));
                assert!(image.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_kit_components() {
        let cli = Cli::try_parse_from([
            "stockbook", "kit", "add", "K1", "-c", "A1:2", "--component", "A2:3",
        ])
        .unwrap();

        match cli.command {
            Command::Kit(KitCommand::Add { components, .. }) => {
                assert_eq!(components, vec![KitComponent::new("A1", 2), KitComponent::new("A2", 3)]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["stockbook", "kit", "add", "K1", "-c", "A1"]).is_err());
        assert!(Cli::try_parse_from(["stockbook", "kit", "add", "K1"]).is_err());
    }

    #[test]
    fn test_record_needs_exactly_one_target() {
        let base = ["stockbook", "sale", "record", "--order", "1", "-q", "1", "-p", "8"];

        assert!(Cli::try_parse_from(base).is_err());

        let both: Vec<&str> = base.iter().copied().chain(["--product", "A1", "--kit", "K1"]).collect();
        assert!(Cli::try_parse_from(both).is_err());

        let kit: Vec<&str> = base.iter().copied().chain(["--kit", "K1", "--carrier", "mondial relay"]).collect();
        let cli = Cli::try_parse_from(kit).unwrap();
        match cli.command {
            Command::Sale(SaleCommand::Record(args)) => {
                assert_eq!(args.target().unwrap(), SaleTarget::kit("K1"));
                assert_eq!(args.carrier, Carrier::MondialRelay);
                assert_eq!(args.platform, Platform::Other);
                assert_eq!(args.fees, Money::zero());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_filter_args() {
        let args = FilterArgs {
            carriers: vec![Carrier::Ups],
            from: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..FilterArgs::default()
        };
        let filter = args.to_filter().unwrap();
        assert!(filter.carriers.contains(&Carrier::Ups));
        assert!(filter.platforms.is_empty());
        assert_eq!(filter.date_range.unwrap().end(), NaiveDate::MAX);

        let backwards = FilterArgs {
            from: NaiveDate::from_ymd_opt(2024, 3, 2),
            to: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..FilterArgs::default()
        };
        assert_eq!(backwards.to_filter().unwrap_err().code(), ErrorCode::ValidationError);

        let cli = Cli::try_parse_from([
            "stockbook", "sale", "list", "--from", "2024-03-02", "--to", "2024-03-01",
        ])
        .unwrap();
        match cli.command {
            Command::Sale(SaleCommand::List { filter }) => {
                assert_eq!(filter.to_filter().unwrap_err().code(), ErrorCode::ValidationError);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
