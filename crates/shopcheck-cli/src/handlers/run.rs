//! Run command handler

use shopcheck::RunConfig;

use crate::commands::RunArgs;
use crate::config::{apply_run_args, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::runner::run_suites;

/// Execute the run command; an error when any test fails or errors
pub fn execute_run(cli: &CliConfig, loaded: RunConfig, args: &RunArgs) -> CliResult<()> {
    let config = apply_run_args(loaded, args)?;
    let mut reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    if cli.verbosity.is_verbose() {
        reporter.info(&format!(
            "target {} at {} ({} jobs)",
            config.target, config.base_url, config.jobs
        ));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(run_suites(config, args.suite.as_deref(), &mut reporter))?;

    reporter.summary(report.passed(), report.failed(), report.skipped(), report.duration);
    if let Some(path) = &args.report {
        report.write(path)?;
        reporter.info(&format!("report written to {}", path.display()));
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::test_execution(format!(
            "{} of {} tests failed",
            report.failed(),
            report.passed() + report.failed() + report.skipped()
        )))
    }
}
