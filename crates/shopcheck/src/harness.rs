//! Test harness for running test suites.
//!
//! Each test gets a fresh [`FixtureScope`]. The harness resolves the
//! fixtures the test declares, runs the body under the test timeout, and
//! always tears the scope down afterwards.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, Instrument};

use crate::config::{RunConfig, DEFAULT_TEST_TIMEOUT_MS};
use crate::fixture::{FixtureScope, FixtureSet, OptionValue, TestContext};
use crate::result::{ShopcheckError, ShopcheckResult};

type TestBody = Arc<dyn Fn(TestContext) -> BoxFuture<'static, ShopcheckResult<()>> + Send + Sync>;

/// A test suite: a fixture set plus the tests that draw on it
#[derive(Debug, Clone)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    /// Fixtures available to every test in the suite
    pub fixtures: FixtureSet,
    /// Tests in this suite
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    /// Create a new test suite
    #[must_use]
    pub fn new(name: impl Into<String>, fixtures: FixtureSet) -> Self {
        Self {
            name: name.into(),
            fixtures,
            tests: Vec::new(),
        }
    }

    /// Add a test case
    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Add several test cases
    pub fn add_tests(&mut self, tests: impl IntoIterator<Item = TestCase>) {
        self.tests.extend(tests);
    }

    /// Get the number of tests
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Test names in registration order
    #[must_use]
    pub fn test_names(&self) -> Vec<&str> {
        self.tests.iter().map(|t| t.name.as_str()).collect()
    }

    /// Check the fixture graph, test names, and what each test asks for
    pub fn validate(&self) -> ShopcheckResult<()> {
        self.fixtures.validate()?;
        let mut seen = HashSet::new();
        for test in &self.tests {
            if !seen.insert(test.name.as_str()) {
                return Err(ShopcheckError::config(format!(
                    "suite '{}' registers '{}' twice",
                    self.name, test.name
                )));
            }
            if let Some(missing) = test.uses.iter().find(|u| !self.fixtures.contains(u)) {
                return Err(ShopcheckError::UnknownFixture {
                    name: missing.clone(),
                });
            }
            if let Some(name) = test.overrides.keys().find(|n| !self.fixtures.is_option(n)) {
                return Err(ShopcheckError::fixture(format!(
                    "test '{}' overrides '{name}', which is not an option",
                    test.name
                )));
            }
        }
        Ok(())
    }
}

/// A single test case
#[derive(Clone)]
pub struct TestCase {
    /// Test name
    pub name: String,
    /// Fixtures handed to the body
    pub uses: Vec<String>,
    /// Per-test option values
    pub overrides: HashMap<String, OptionValue>,
    /// Test timeout in milliseconds; the harness default applies when unset
    pub timeout_ms: Option<u64>,
    body: TestBody,
}

impl TestCase {
    /// Create a new test case
    #[must_use]
    pub fn new<F, Fut>(name: impl Into<String>, uses: &[&str], body: F) -> Self
    where
        F: Fn(TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ShopcheckResult<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            uses: uses.iter().map(ToString::to_string).collect(),
            overrides: HashMap::new(),
            timeout_ms: None,
            body: Arc::new(move |ctx| body(ctx).boxed()),
        }
    }

    /// Override an option fixture for this test only
    #[must_use]
    pub fn with_option<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        let _ = self.overrides.insert(name.into(), OptionValue::new(value));
        self
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("uses", &self.uses)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

/// Outcome of one test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Body completed without error
    Passed,
    /// Body returned an error (assertion or action failure)
    Failed,
    /// Fixture setup or teardown failed, or the test timed out
    Errored,
    /// Not run (fail-fast stopped the suite)
    Skipped,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Errored => "errored",
            Self::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Outcome
    pub status: TestStatus,
    /// Error message if the test did not pass
    pub error: Option<String>,
    /// Test duration
    pub duration: Duration,
    /// Fixtures that were set up, in setup order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixtures: Vec<String>,
}

impl TestResult {
    /// Create a passing test result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            error: None,
            duration: Duration::ZERO,
            fixtures: Vec::new(),
        }
    }

    /// Create a failing test result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Failed,
            error: Some(error.into()),
            ..Self::pass(name)
        }
    }

    /// Create a result for a test that was never run
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Skipped,
            ..Self::pass(name)
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the test passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }

    /// Whether the test failed or errored
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TestStatus::Failed | TestStatus::Errored)
    }
}

/// Results from running a test suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual test results
    pub results: Vec<TestResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Check that nothing failed or errored
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.results.iter().any(TestResult::is_failure)
    }

    /// Count passed tests
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    /// Count failed and errored tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    /// Count skipped tests
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Skipped)
            .count()
    }

    /// Get total test count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed tests
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| r.is_failure()).collect()
    }

    /// Look up a result by test name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

enum Failure {
    Setup(ShopcheckError),
    Body(ShopcheckError),
}

/// Test harness for running suites
#[derive(Debug, Clone)]
pub struct TestHarness {
    /// Whether to stop on first failure
    pub fail_fast: bool,
    /// Maximum number of tests in flight
    pub jobs: usize,
    /// Only run tests whose name contains this
    pub filter: Option<String>,
    /// Default test timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self {
            fail_fast: false,
            jobs: 1,
            filter: None,
            timeout_ms: DEFAULT_TEST_TIMEOUT_MS,
        }
    }
}

impl From<&RunConfig> for TestHarness {
    fn from(config: &RunConfig) -> Self {
        Self {
            fail_fast: config.fail_fast,
            jobs: config.jobs,
            filter: config.filter.clone(),
            timeout_ms: config.test_timeout_ms,
        }
    }
}

impl TestHarness {
    /// Create a new test harness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Run up to `jobs` tests concurrently
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Only run tests whose name contains `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the default test timeout
    #[must_use]
    pub const fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Whether `name` passes the filter
    #[must_use]
    pub fn selects(&self, name: &str) -> bool {
        self.filter.as_deref().map_or(true, |f| name.contains(f))
    }

    /// Run a test suite
    pub async fn run(&self, suite: &TestSuite) -> ShopcheckResult<SuiteResults> {
        suite.validate()?;
        let start = Instant::now();
        let fixtures = Arc::new(suite.fixtures.clone());
        let stop = AtomicBool::new(false);

        let selected: Vec<&TestCase> = suite.tests.iter().filter(|t| self.selects(&t.name)).collect();
        info!(suite = %suite.name, tests = selected.len(), jobs = self.jobs, "running suite");

        let results = stream::iter(selected)
            .map(|case| {
                let fixtures = Arc::clone(&fixtures);
                let stop = &stop;
                async move {
                    if stop.load(Ordering::SeqCst) {
                        return TestResult::skipped(&case.name);
                    }
                    let result = self.run_case(fixtures, case).await;
                    if self.fail_fast && result.is_failure() {
                        stop.store(true, Ordering::SeqCst);
                    }
                    result
                }
            })
            .buffered(self.jobs.max(1))
            .collect::<Vec<_>>()
            .await;

        Ok(SuiteResults {
            suite_name: suite.name.clone(),
            results,
            duration: start.elapsed(),
        })
    }

    async fn run_case(&self, fixtures: Arc<FixtureSet>, case: &TestCase) -> TestResult {
        let span = info_span!("test", name = %case.name);
        async move {
            let start = Instant::now();
            let timeout_ms = case.timeout_ms.unwrap_or(self.timeout_ms);
            let uses: Vec<&str> = case.uses.iter().map(String::as_str).collect();
            let mut scope = FixtureScope::new(fixtures, case.overrides.clone());

            let outcome = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
                let ctx = scope.resolve(&uses).await.map_err(Failure::Setup)?;
                (case.body)(ctx).await.map_err(Failure::Body)
            })
            .await;

            let (mut status, mut error) = match outcome {
                Ok(Ok(())) => (TestStatus::Passed, None),
                Ok(Err(Failure::Setup(e))) => (TestStatus::Errored, Some(e.to_string())),
                Ok(Err(Failure::Body(e))) => (TestStatus::Failed, Some(e.to_string())),
                Err(_) => (
                    TestStatus::Errored,
                    Some(ShopcheckError::TestTimeout { ms: timeout_ms }.to_string()),
                ),
            };

            let set_up = scope.completed().to_vec();
            if let Err(e) = scope.teardown().await {
                if status == TestStatus::Passed {
                    status = TestStatus::Errored;
                    error = Some(e.to_string());
                }
            }

            let duration = start.elapsed();
            info!(
                status = %status,
                duration_ms = duration.as_millis() as u64,
                "test finished"
            );
            TestResult {
                name: case.name.clone(),
                status,
                error,
                duration,
                fixtures: set_up,
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counting_fixtures(teardowns: &Arc<AtomicU32>) -> FixtureSet {
        let counter = Arc::clone(teardowns);
        FixtureSet::new("counting")
            .option("user", "standard_user".to_string())
            .fixture_with_teardown(
                "page",
                &[],
                |_ctx| async { Ok(()) },
                move |_value: Arc<()>| {
                    let counter = Arc::clone(&counter);
                    async move {
                        let _ = counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                },
            )
    }

    mod test_result_tests {
        use super::*;

        #[test]
        fn test_constructors() {
            assert!(TestResult::pass("a").passed());
            let failed = TestResult::fail("b", "boom").with_duration(Duration::from_millis(5));
            assert!(failed.is_failure());
            assert_eq!(failed.error.as_deref(), Some("boom"));
            assert_eq!(failed.duration, Duration::from_millis(5));
            assert!(!TestResult::skipped("c").is_failure());
        }

        #[test]
        fn test_suite_results_counts() {
            let results = SuiteResults {
                suite_name: "login".to_string(),
                results: vec![
                    TestResult::pass("a"),
                    TestResult::fail("b", "boom"),
                    TestResult::skipped("c"),
                ],
                duration: Duration::ZERO,
            };
            assert_eq!(results.total(), 3);
            assert_eq!(results.passed_count(), 1);
            assert_eq!(results.failed_count(), 1);
            assert_eq!(results.skipped_count(), 1);
            assert!(!results.all_passed());
            assert_eq!(results.failures()[0].name, "b");
            assert!(results.get("c").is_some());
        }

        #[test]
        fn test_status_serializes_lowercase() {
            let json = serde_json::to_value(TestResult::fail("b", "boom")).unwrap();
            assert_eq!(json["status"], "failed");
            assert!(json.get("fixtures").is_none());
        }
    }

    mod test_suite_tests {
        use super::*;

        #[test]
        fn test_rejects_duplicate_names() {
            let mut suite = TestSuite::new("dupes", FixtureSet::new("none"));
            suite.add_test(TestCase::new("same", &[], |_ctx| async { Ok(()) }));
            suite.add_test(TestCase::new("same", &[], |_ctx| async { Ok(()) }));
            assert!(suite.validate().is_err());
        }

        #[test]
        fn test_rejects_unknown_fixture_and_bad_override() {
            let teardowns = Arc::new(AtomicU32::new(0));
            let mut suite = TestSuite::new("bad", counting_fixtures(&teardowns));
            suite.add_test(TestCase::new("uses missing", &["login"], |_ctx| async { Ok(()) }));
            assert!(matches!(
                suite.validate(),
                Err(ShopcheckError::UnknownFixture { .. })
            ));

            let mut suite = TestSuite::new("bad", counting_fixtures(&teardowns));
            suite.add_test(
                TestCase::new("overrides page", &["page"], |_ctx| async { Ok(()) })
                    .with_option("page", ()),
            );
            assert!(suite.validate().is_err());
        }
    }

    mod test_harness_tests {
        use super::*;

        #[tokio::test]
        async fn test_statuses_and_teardown_once_per_test() {
            let teardowns = Arc::new(AtomicU32::new(0));
            let mut suite = TestSuite::new("statuses", counting_fixtures(&teardowns));
            suite.add_test(TestCase::new("passes", &["page"], |_ctx| async { Ok(()) }));
            suite.add_test(TestCase::new("fails", &["page"], |_ctx| async {
                Err(ShopcheckError::AssertionFailed {
                    assertion: "to_contain_text".to_string(),
                    selector: "css=.x".to_string(),
                    expected: "29.99".to_string(),
                    actual: "\"9.99\"".to_string(),
                })
            }));
            suite.add_test(
                TestCase::new("times out", &["page"], |_ctx| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                })
                .with_timeout(20),
            );

            let results = TestHarness::new().run(&suite).await.unwrap();
            assert_eq!(results.get("passes").unwrap().status, TestStatus::Passed);
            let failed = results.get("fails").unwrap();
            assert_eq!(failed.status, TestStatus::Failed);
            assert!(failed.error.as_ref().unwrap().contains("expected: 29.99"));
            let timed_out = results.get("times out").unwrap();
            assert_eq!(timed_out.status, TestStatus::Errored);
            assert!(timed_out.error.as_ref().unwrap().contains("timed out"));
            assert_eq!(teardowns.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_setup_failure_is_errored() {
            let set = FixtureSet::new("broken").fixture("page", &[], |_ctx| async {
                Err::<(), _>(ShopcheckError::BrowserLaunch {
                    message: "no chromium".to_string(),
                })
            });
            let mut suite = TestSuite::new("broken", set);
            suite.add_test(TestCase::new("never runs", &["page"], |_ctx| async {
                Err(ShopcheckError::page("body ran"))
            }));
            let results = TestHarness::new().run(&suite).await.unwrap();
            let result = results.get("never runs").unwrap();
            assert_eq!(result.status, TestStatus::Errored);
            let error = result.error.as_ref().unwrap();
            assert!(error.contains("no chromium"));
            assert!(!error.contains("body ran"));
        }

        #[tokio::test]
        async fn test_fail_fast_skips_the_rest() {
            let mut suite = TestSuite::new("ff", FixtureSet::new("none"));
            suite.add_test(TestCase::new("first", &[], |_ctx| async {
                Err(ShopcheckError::page("boom"))
            }));
            suite.add_test(TestCase::new("second", &[], |_ctx| async { Ok(()) }));
            let results = TestHarness::new().with_fail_fast().run(&suite).await.unwrap();
            assert_eq!(results.get("second").unwrap().status, TestStatus::Skipped);
            assert_eq!(results.failed_count(), 1);
        }

        #[tokio::test]
        async fn test_filter_and_option_override() {
            let teardowns = Arc::new(AtomicU32::new(0));
            let mut suite = TestSuite::new("opts", counting_fixtures(&teardowns));
            suite.add_test(
                TestCase::new("can log in problem_user", &["user"], |ctx| async move {
                    let user = ctx.get::<String>("user")?;
                    if user.as_str() == "problem_user" {
                        Ok(())
                    } else {
                        Err(ShopcheckError::page(format!("got {user}")))
                    }
                })
                .with_option("user", "problem_user".to_string()),
            );
            suite.add_test(TestCase::new("logout", &[], |_ctx| async { Ok(()) }));

            let harness = TestHarness::new().with_filter("can log in").with_jobs(2);
            let results = harness.run(&suite).await.unwrap();
            assert_eq!(results.total(), 1);
            assert!(results.all_passed());
        }
    }
}
