//! Shopcheck CLI: list and run the storefront suites
//!
//! ## Usage
//!
//! ```bash
//! shopcheck list                          # Suites and test names
//! shopcheck run                           # Run everything
//! shopcheck run --filter "can log in" -j4 # Filter, run concurrently
//! shopcheck run --report report.json      # Write a JSON report
//! ```

use clap::Parser;
use shopcheck::RunConfig;
use shopcheck_cli::{
    handlers::{execute_list, execute_run},
    logging, Cli, CliConfig, CliResult, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(config.verbosity, config.log_format)?;

    let loaded = RunConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::List(args) => execute_list(&loaded, &args),
        Commands::Run(args) => execute_run(&config, loaded, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
        .with_log_format(cli.log_format)
}
