//! Tracing subscriber setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::LogFormat;
use crate::config::Verbosity;
use crate::error::{CliError, CliResult};

/// Filter from `RUST_LOG` when set, otherwise from the verbosity flags
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()))
}

/// Install the global subscriber; logs go to stderr so stdout stays clean
pub fn init(verbosity: Verbosity, format: LogFormat) -> CliResult<()> {
    let registry = tracing_subscriber::registry().with(env_filter(verbosity));
    let result = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|e| CliError::config(format!("cannot install logger: {e}")))
}
