//! Suite execution and the JSON run report

use serde::{Deserialize, Serialize};
use shopcheck::{Browser, RunConfig, SuiteResults, TestHarness, TestSuite};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;

/// Everything one `shopcheck run` produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id of this run
    pub run_id: Uuid,
    /// RFC 3339 start time
    pub started_at: String,
    /// Effective configuration
    pub config: RunConfig,
    /// Per-suite results, in run order
    pub suites: Vec<SuiteResults>,
    /// Wall time of the whole run
    pub duration: Duration,
}

impl RunReport {
    /// Passed tests across suites
    #[must_use]
    pub fn passed(&self) -> usize {
        self.suites.iter().map(SuiteResults::passed_count).sum()
    }

    /// Failed or errored tests across suites
    #[must_use]
    pub fn failed(&self) -> usize {
        self.suites.iter().map(SuiteResults::failed_count).sum()
    }

    /// Skipped tests across suites
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.suites.iter().map(SuiteResults::skipped_count).sum()
    }

    /// Whether every suite passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.suites.iter().all(SuiteResults::all_passed)
    }

    /// Write the report as pretty JSON
    pub fn write(&self, path: &Path) -> CliResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            CliError::report_generation(format!("cannot write {}: {e}", path.display()))
        })
    }
}

/// Keep only the suite called `name`, or every suite when `name` is unset
pub fn select_suites(suites: Vec<TestSuite>, name: Option<&str>) -> CliResult<Vec<TestSuite>> {
    let Some(name) = name else {
        return Ok(suites);
    };
    let known: Vec<String> = suites.iter().map(|s| s.name.clone()).collect();
    let selected: Vec<TestSuite> = suites.into_iter().filter(|s| s.name == name).collect();
    if selected.is_empty() {
        return Err(CliError::config(format!(
            "unknown suite '{name}' (available: {})",
            known.join(", ")
        )));
    }
    Ok(selected)
}

/// Run the selected suites one after another against a launched browser
pub async fn run_suites(
    config: RunConfig,
    suite: Option<&str>,
    reporter: &mut ProgressReporter,
) -> CliResult<RunReport> {
    let start = Instant::now();
    let started_at = chrono::Utc::now().to_rfc3339();
    let browser = Browser::launch(&config).await?;
    let harness = TestHarness::from(&config);
    let suites = select_suites(shopcheck::suites::all_suites(&browser), suite)?;

    let mut results = Vec::with_capacity(suites.len());
    for suite in &suites {
        let selected = suite.test_names().into_iter().filter(|n| harness.selects(n)).count();
        reporter.start_suite(&suite.name, selected);
        let outcome = harness.run(suite).await;
        reporter.finish_suite();
        let outcome = outcome?;
        reporter.suite_results(&outcome);
        info!(
            suite = %outcome.suite_name,
            passed = outcome.passed_count(),
            failed = outcome.failed_count(),
            "suite finished"
        );
        let stop = config.fail_fast && !outcome.all_passed();
        results.push(outcome);
        if stop {
            break;
        }
    }
    browser.close().await?;

    Ok(RunReport {
        run_id: Uuid::new_v4(),
        started_at,
        config,
        suites: results,
        duration: start.elapsed(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn suites() -> Vec<TestSuite> {
        shopcheck::suites::all_suites(&Browser::simulated(shopcheck::DEFAULT_BASE_URL))
    }

    mod select_tests {
        use super::*;

        #[test]
        fn test_select_all() {
            assert_eq!(select_suites(suites(), None).unwrap().len(), 2);
        }

        #[test]
        fn test_select_by_name() {
            let selected = select_suites(suites(), Some("cart")).unwrap();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].name, "cart");
        }

        #[test]
        fn test_unknown_suite() {
            let err = select_suites(suites(), Some("search")).unwrap_err();
            assert!(err.to_string().contains("login, cart"));
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_run_filtered_suite_and_write_report() {
            let config = RunConfig {
                filter: Some("can log in".to_string()),
                jobs: 3,
                ..RunConfig::default()
            };
            let mut reporter = ProgressReporter::new(false, true);
            let report = run_suites(config, Some("login"), &mut reporter).await.unwrap();
            assert!(report.all_passed());
            assert_eq!(report.passed(), 3);
            assert_eq!(report.failed(), 0);

            let dir = TempDir::new().unwrap();
            let path = dir.path().join("report.json");
            report.write(&path).unwrap();
            let back: RunReport =
                serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
            assert_eq!(back.run_id, report.run_id);
            assert_eq!(back.suites[0].results.len(), 3);
        }
    }
}
