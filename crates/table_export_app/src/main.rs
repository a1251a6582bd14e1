mod cli;
mod commands;
mod config;

use clap::Parser;
use export_logging::LogDestination;
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    export_logging::initialize(destination, level);

    let config = config::load_config(&cli.config);
    commands::run(cli.command, &config)
}
