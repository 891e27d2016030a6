//! Result and error types for shopcheck.

use thiserror::Error;

/// Result type for shopcheck operations
pub type ShopcheckResult<T> = Result<T, ShopcheckError>;

/// Errors that can occur while driving a storefront test
#[derive(Debug, Error)]
pub enum ShopcheckError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error (page creation, evaluation, closing)
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched within the implicit wait
    #[error("Timed out after {waited_ms}ms waiting for {selector}: {reason}")]
    LocatorTimeout {
        /// Rendered selector chain
        selector: String,
        /// How long the locator waited
        waited_ms: u64,
        /// What the locator was waiting for
        reason: String,
    },

    /// An action resolved to more than one element
    #[error("Strict mode violation: {selector} resolved to {count} elements")]
    StrictModeViolation {
        /// Rendered selector chain
        selector: String,
        /// Number of matching elements
        count: usize,
    },

    /// A selector the driver cannot parse
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// Selector source
        selector: String,
        /// What is wrong with it
        message: String,
    },

    /// The element exists but cannot receive the action
    #[error("Element {selector} is not interactable: {message}")]
    NotInteractable {
        /// Rendered selector chain
        selector: String,
        /// Error message
        message: String,
    },

    /// An `expect()` assertion did not hold within its timeout
    #[error("Assertion {assertion} failed for {selector}\n  expected: {expected}\n  actual:   {actual}")]
    AssertionFailed {
        /// Assertion name, e.g. `to_contain_text`
        assertion: String,
        /// Rendered selector chain
        selector: String,
        /// Expected value
        expected: String,
        /// Last observed value
        actual: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Fixture dependencies form a cycle
    #[error("Fixture dependency cycle: {}", path.join(" -> "))]
    FixtureCycle {
        /// Names along the cycle, first name repeated at the end
        path: Vec<String>,
    },

    /// A test or fixture asked for a name no fixture set defines
    #[error("Unknown fixture '{name}'")]
    UnknownFixture {
        /// Requested name
        name: String,
    },

    /// Test-wide timeout elapsed
    #[error("Test timed out after {ms}ms")]
    TestTimeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ShopcheckError {
    /// Create a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Whether the error is an assertion mismatch rather than an automation failure
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
