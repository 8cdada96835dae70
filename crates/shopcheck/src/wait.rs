//! Wait mechanisms.
//!
//! Every auto-waiting operation in [`crate::Page`] is a [`poll_until`] loop:
//! probe, sleep for the poll interval, probe again, give up at the deadline.
//! The loop never retries an *action*; it only waits for the page to reach a
//! state where the action can happen once.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::result::{ShopError, ShopResult};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

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
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
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

/// Outcome of one probe inside [`poll_until`]
#[derive(Debug)]
pub enum Probe<T> {
    /// Condition met
    Ready(T),
    /// Not yet; the string says what was observed
    Pending(String),
}

/// Poll `probe` until it is ready or the timeout elapses.
///
/// Transient errors (see [`ShopError::is_transient`]) count as a pending
/// observation, so a navigation landing mid-poll does not fail the wait.
/// Any other error aborts immediately: a strict-mode violation does not get
/// better by waiting. On timeout the error names `waited_for` and the last
/// observation.
///
/// # Errors
///
/// Returns the probe's error, or `ShopError::Timeout`.
pub async fn poll_until<T, F, Fut>(
    options: WaitOptions,
    waited_for: &str,
    mut probe: F,
) -> ShopResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ShopResult<Probe<T>>>,
{
    let start = Instant::now();
    loop {
        let observed = match probe().await {
            Ok(Probe::Ready(value)) => return Ok(value),
            Ok(Probe::Pending(observed)) => observed,
            Err(e) if e.is_transient() => {
                tracing::debug!(error = %e, waited_for, "transient error while waiting");
                e.to_string()
            }
            Err(e) => return Err(e),
        };

        if start.elapsed() >= options.timeout() {
            let detail = if observed.is_empty() {
                waited_for.to_string()
            } else {
                format!("{waited_for} ({observed})")
            };
            return Err(ShopError::Timeout {
                ms: options.timeout_ms,
                waited_for: detail,
            });
        }

        tokio::time::sleep(options.poll_interval()).await;
    }
}
