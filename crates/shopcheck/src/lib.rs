//! Shopcheck: page objects and composable fixtures for storefront e2e tests
//!
//! Tests drive a storefront through page objects built on deferred, auto-waiting
//! locators. Fixtures set up what a test declares it needs (a page, a logged-in
//! session, page objects), memoized per test and torn down in reverse order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SHOPCHECK Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ TestCase   │    │ Fixture    │    │ Page       │            │
//! │   │ + table    │───►│ Scope      │───►│ Objects    │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             ▼                   │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Simulated  │◄───│ PageDriver │◄───│ Locator /  │            │
//! │   │ storefront │    │ (or CDP)   │    │ expect()   │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let browser = Browser::simulated(DEFAULT_BASE_URL);
//! let results = TestHarness::new().run(&login_suite(&browser)).await?;
//! assert!(results.all_passed());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod assertion;
mod browser;
mod config;
mod driver;
mod fixture;
mod harness;
mod locator;
mod page_object;
mod result;
mod table;

/// Auto-wait: poll a probe until it is ready or the timeout elapses
pub mod wait;

/// Page objects for each storefront screen
pub mod pages;

/// In-process simulated storefront implementing the driver traits
#[allow(
    missing_docs,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_panics_doc
)]
pub mod demo_site;

/// Storefront fixtures, credential tables and the login / cart suites
#[allow(missing_docs, clippy::missing_errors_doc)]
pub mod suites;

pub use assertion::{expect, Expect};
pub use browser::{resolve_url, Browser, BrowserConfig, Page};
pub use config::{RunConfig, Target, DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE, DEFAULT_TEST_TIMEOUT_MS};
pub use driver::{BrowserDriver, ElementHandle, PageDriver};
pub use fixture::{FixtureScope, FixtureSet, FixtureValue, OptionValue, TestContext};
pub use harness::{SuiteResults, TestCase, TestHarness, TestResult, TestStatus, TestSuite};
pub use locator::{normalize_whitespace, text_matches, AriaRole, Filter, Locator, Selector, Step};
pub use page_object::{path_of, PageObject, UrlMatcher};
pub use result::{ShopcheckError, ShopcheckResult};
pub use table::parameterize;
pub use wait::{WaitOptions, DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS};
