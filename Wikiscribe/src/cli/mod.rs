//! Wikiscribe CLI - Command-line interface for dialogue transcripts

pub mod commands;

use clap::Parser;
use commands::Commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wikiscribe")]
#[command(about = "Wikiscribe: render branching game dialogue as wikitext", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the Wikiscribe CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays pure wikitext
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(cli.command.execute())?;

    Ok(())
}
