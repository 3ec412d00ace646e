//! Binary crate for the `meteo` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and place picking
//! - Human-friendly output formatting

use clap::Parser;
use tracing::warn;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API_BASE may live in `.env`.
    let dotenv = cli::load_dotenv(None);

    let cmd = cli::Cli::parse();
    cmd.init_tracing();

    if let Err(err) = dotenv {
        warn!(error = %err, "ignoring unreadable .env file");
    }

    cmd.run().await
}
