mod cli;
mod coerce;
mod error;
mod filters;
mod logging;
mod output;
mod pipeline;
mod readers;
mod types;

use clap::Parser;
use cli::Cli;
use types::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&logging::LogConfig::from_flags(cli.verbose, cli.quiet));
    tracing::info!("Starting data cleaning...");

    pipeline::run(&cli.run_options())?;

    Ok(())
}
