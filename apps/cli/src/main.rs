//! qaharvest CLI: harvest Q&A pages into structured JSON records.
//!
//! Discovers question URLs, fetches each page, and writes one record per
//! question with its ordered content blocks, tags and answers.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
