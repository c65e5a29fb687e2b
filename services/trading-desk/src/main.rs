use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use trading_desk::{Desk, DeskConfig};

#[derive(Parser)]
#[command(name = "trading-desk")]
#[command(about = "Run the price, order book and trade feeds through the desk pipeline")]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding prices.txt, marketdata.txt and trades.txt
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for positions.txt, risk.txt and executions.txt
    #[arg(long)]
    result_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => DeskConfig::load(path)?,
        None => DeskConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.result_dir {
        config.result_dir = dir;
    }

    tracing::info!(
        data_dir = %config.data_dir.display(),
        result_dir = %config.result_dir.display(),
        "Starting trading desk"
    );

    let mut desk = Desk::build(config)?;
    let summary = desk.run()?;

    tracing::info!(?summary, "Finished");
    Ok(())
}
