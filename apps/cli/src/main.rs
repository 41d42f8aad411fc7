//! `stockbook` binary entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use stockbook_cli::cli::Cli;
use stockbook_cli::{init_tracing, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(cli, &mut out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message());
            err.exit_code()
        }
    }
}
