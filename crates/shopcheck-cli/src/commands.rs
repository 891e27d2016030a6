//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shopcheck: run the storefront page-object suites
#[derive(Parser, Debug)]
#[command(name = "shopcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Configuration file (defaults to ./shopcheck.yaml when present)
    #[arg(long, global = true, env = "SHOPCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List suites and the tests they would run
    List(ListArgs),

    /// Run the suites
    Run(RunArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list tests whose name contains this
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only list this suite
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Only run tests whose name contains this
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only run this suite
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Number of tests to run concurrently
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Stop after the first failing test
    #[arg(long)]
    pub fail_fast: bool,

    /// Browser driver to run against
    #[arg(long)]
    pub target: Option<TargetArg>,

    /// Storefront base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Test timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Implicit wait for actions and assertions, in milliseconds
    #[arg(long)]
    pub action_timeout: Option<u64>,

    /// Write a JSON report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Browser driver argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetArg {
    /// In-process simulated storefront
    Simulated,
    /// Real Chromium over CDP
    Chromium,
}

impl From<TargetArg> for shopcheck::Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Simulated => Self::Simulated,
            TargetArg::Chromium => Self::Chromium,
        }
    }
}
