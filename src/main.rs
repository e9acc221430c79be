mod artifact;
mod cli;
mod config;
mod credentials;
mod download;
mod error;
mod manifest;
mod progress;
mod remote;
mod sync;
mod watermark;
mod window;

use anyhow::{Error, Result};
use chrono::Local;
use clap::Parser;
use cli::{command, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match &cli.command {
        Commands::Sync(args) => match command::sync(args).await {
            Ok(summary) => println!("{}", summary),
            Err(e) => eprintln!("Error: {}", e),
        },
        Commands::Status { memory_file } => match command::status(memory_file, Local::now().date_naive()) {
            Ok(report) => println!("{}", report),
            Err(e) => eprintln!("Error: {}", e),
        },
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "cddis_sync=debug,warn" } else { "cddis_sync=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
