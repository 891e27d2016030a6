//! Shopcheck CLI Library
//!
//! Command-line interface for listing and running the storefront suites.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)] // String building is clear and correct
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ListArgs, LogFormat, RunArgs, TargetArg};
pub use config::{apply_run_args, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{run_suites, select_suites, RunReport};
