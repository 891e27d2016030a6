//! Run configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, a YAML file,
//! `SHOPCHECK_*` environment variables, then whatever the caller (usually the
//! CLI) sets on the struct afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::result::{ShopcheckError, ShopcheckResult};
use crate::wait::{WaitOptions, DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS};

/// Storefront the suites run against by default
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// Default per-test timeout (30 seconds)
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 30_000;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "shopcheck.yaml";

/// Which browser driver to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// In-process simulated storefront
    #[default]
    Simulated,
    /// Real Chromium over CDP (needs the `browser` feature)
    Chromium,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => f.write_str("simulated"),
            Self::Chromium => f.write_str("chromium"),
        }
    }
}

impl FromStr for Target {
    type Err = ShopcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" | "sim" => Ok(Self::Simulated),
            "chromium" | "chrome" => Ok(Self::Chromium),
            other => Err(ShopcheckError::config(format!("unknown target '{other}'"))),
        }
    }
}

/// Settings for one run of the suites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Storefront base URL
    pub base_url: String,
    /// Browser driver
    pub target: Target,
    /// Run Chromium headless
    pub headless: bool,
    /// Chromium sandbox (disable in containers)
    pub sandbox: bool,
    /// Chromium binary override
    pub chromium_path: Option<String>,
    /// Implicit wait for actions and assertions
    pub action_timeout_ms: u64,
    /// Poll interval while waiting
    pub poll_interval_ms: u64,
    /// Test-wide timeout covering fixture setup and the body
    pub test_timeout_ms: u64,
    /// Tests run concurrently
    pub jobs: usize,
    /// Stop after the first failing test
    pub fail_fast: bool,
    /// Only run tests whose name contains this
    pub filter: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            target: Target::Simulated,
            headless: true,
            sandbox: true,
            chromium_path: None,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            test_timeout_ms: DEFAULT_TEST_TIMEOUT_MS,
            jobs: 1,
            fail_fast: false,
            filter: None,
        }
    }
}

impl RunConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml(source: &str) -> ShopcheckResult<Self> {
        Ok(serde_yaml_ng::from_str(source)?)
    }

    /// Read a YAML file
    pub fn from_file(path: &Path) -> ShopcheckResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    /// Defaults, overlaid with `path` (or `shopcheck.yaml` if it exists), then
    /// with the process environment
    pub fn load(path: Option<&Path>) -> ShopcheckResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Overlay `SHOPCHECK_*` variables
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> ShopcheckResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                "SHOPCHECK_BASE_URL" => self.base_url = value.to_string(),
                "SHOPCHECK_TARGET" => self.target = value.parse()?,
                "SHOPCHECK_HEADLESS" => self.headless = parse_bool("SHOPCHECK_HEADLESS", value)?,
                "SHOPCHECK_CHROMIUM_PATH" => self.chromium_path = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(())
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> ShopcheckResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ShopcheckError::config("base_url must not be empty"));
        }
        if self.action_timeout_ms == 0 || self.test_timeout_ms == 0 {
            return Err(ShopcheckError::config("timeouts must be greater than zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ShopcheckError::config("poll_interval_ms must be greater than zero"));
        }
        if self.jobs == 0 {
            return Err(ShopcheckError::config("jobs must be at least 1"));
        }
        Ok(())
    }

    /// Implicit wait derived from this configuration
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.action_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> ShopcheckResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

fn parse_bool(key: &str, value: &str) -> ShopcheckResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ShopcheckError::config(format!(
            "{key}: expected a boolean, got '{other}'"
        ))),
    }
}
