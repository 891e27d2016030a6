//! Auto-wait mechanics shared by locators and assertions.
//!
//! Every action and assertion is a suspension point: it probes the page,
//! and if the page is not yet in the wanted state it sleeps for one poll
//! interval and probes again, until the implicit wait elapses.

use crate::result::ShopcheckResult;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default implicit wait for actions and assertions (5 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of a single probe of the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The wanted state was observed
    Ready(T),
    /// Not there yet; carries a description of what was observed instead
    Pending(String),
}

/// Outcome of a full wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// The wanted state was observed
    Ready(T),
    /// The implicit wait elapsed
    TimedOut {
        /// Time spent waiting
        waited_ms: u64,
        /// What the last probe saw
        last_observed: String,
    },
}

/// Probe repeatedly until the probe reports `Ready` or the timeout elapses.
///
/// The probe always runs at least once. Errors from the probe are not
/// retried; they abort the wait immediately.
pub async fn poll_until<T, F, Fut>(options: WaitOptions, mut probe: F) -> ShopcheckResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ShopcheckResult<Probe<T>>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let interval = options.poll_interval().max(Duration::from_millis(1));

    loop {
        match probe().await? {
            Probe::Ready(value) => return Ok(WaitOutcome::Ready(value)),
            Probe::Pending(observed) => {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    return Ok(WaitOutcome::TimedOut {
                        waited_ms: elapsed.as_millis() as u64,
                        last_observed: observed,
                    });
                }
                tokio::time::sleep(interval.min(timeout - elapsed)).await;
            }
        }
    }
}
