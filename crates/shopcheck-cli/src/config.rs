//! CLI configuration

use serde::{Deserialize, Serialize};
use shopcheck::RunConfig;

use crate::commands::{ColorArg, LogFormat, RunArgs};
use crate::error::CliResult;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Map `-q` / `-v` counts to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Log filter used when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Log line format
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set log format
    #[must_use]
    pub const fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

/// Overlay `run` flags on a loaded configuration and validate the result
pub fn apply_run_args(mut config: RunConfig, args: &RunArgs) -> CliResult<RunConfig> {
    if let Some(filter) = &args.filter {
        config.filter = Some(filter.clone());
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
    if let Some(target) = args.target {
        config.target = target.into();
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(ms) = args.timeout {
        config.test_timeout_ms = ms;
    }
    if let Some(ms) = args.action_timeout {
        config.action_timeout_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["shopcheck", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            Commands::List(_) => unreachable!(),
        }
    }

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Debug);
        }

        #[test]
        fn test_log_directive() {
            assert_eq!(Verbosity::Quiet.log_directive(), "error");
            assert_eq!(Verbosity::Debug.log_directive(), "debug");
            assert!(Verbosity::Debug.is_verbose());
            assert!(!Verbosity::Normal.is_verbose());
        }

        #[test]
        fn test_color_choice() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
        }
    }

    mod run_args_tests {
        use super::*;

        #[test]
        fn test_flags_override_file_values() {
            let file = RunConfig::from_yaml("jobs: 2\nfilter: cart\ntest_timeout_ms: 1000\n").unwrap();
            let config = apply_run_args(file, &run_args(&["-j", "8", "--timeout", "5000"])).unwrap();
            assert_eq!(config.jobs, 8);
            assert_eq!(config.test_timeout_ms, 5000);
            assert_eq!(config.filter.as_deref(), Some("cart"));
        }

        #[test]
        fn test_zero_jobs_rejected() {
            let err = apply_run_args(RunConfig::default(), &run_args(&["-j", "0"])).unwrap_err();
            assert!(err.to_string().contains("jobs"));
        }
    }
}
