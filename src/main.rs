use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use openutp::cli::{Cli, Commands};
use openutp::commands::{color, consolidate, inspect};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match &cli.command {
        Commands::Consolidate(args) => consolidate::run(&cli, args),
        Commands::Color(args) => color::run(&cli, args),
        Commands::Inspect(args) => inspect::run(&cli, args),
    }
}
