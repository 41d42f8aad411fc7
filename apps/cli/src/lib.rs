//! # Stockbook CLI
//!
//! Thin front end over `stockbook-store`.
//!
//! ```text
//! main.rs ──► Cli::parse ──► init_tracing ──► run
//!                                              │
//!                    StoreConfig (--db / env / data dir)
//!                                              │
//!                                     Session::open
//!                                              │
//!                               commands::dispatch ──► stdout
//! ```
//!
//! Logs go to stderr so that `sale export` output on stdout stays clean CSV.

pub mod cli;
pub mod commands;
pub mod error;

use std::io::Write;

use stockbook_store::{Session, StoreConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

/// Sets up the tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,stockbook=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the store, runs one command and closes the store again.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<(), CliError> {
    let config = match cli.db {
        Some(path) => StoreConfig::new(path),
        None => StoreConfig::from_env()?,
    };
    debug!(path = %config.database_path.display(), "Opening store");

    let mut session = Session::open(config).await?;
    let today = chrono::Local::now().date_naive();

    let result = commands::dispatch(&mut session, cli.command, today, out).await;
    session.close().await;
    result
}
