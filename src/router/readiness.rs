use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Reports whether the grid library has finished loading.
pub trait LibraryProbe: Send + Sync {
    fn is_loaded(&self) -> bool;
}

impl<F> LibraryProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_loaded(&self) -> bool {
        self()
    }
}

/// Probe for hosts that ship the library inline.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysLoaded;

impl LibraryProbe for AlwaysLoaded {
    fn is_loaded(&self) -> bool {
        true
    }
}

/// Bounded exponential backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2000),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay after the `attempt`-th failed check (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("grid library not available after {attempts} attempts")]
    TimedOut { attempts: u32 },
}

/// Polls `probe` until it reports loaded, sleeping per `policy` between
/// checks. Returns the number of checks made.
pub async fn wait_for_library(
    probe: &dyn LibraryProbe,
    policy: &RetryPolicy,
) -> Result<u32, ReadinessError> {
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        if probe.is_loaded() {
            debug!(attempt, "grid library available");
            return Ok(attempt);
        }
        if attempt < max_attempts {
            let delay = policy.delay_for(attempt);
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "grid library not loaded yet, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
    warn!(attempts = max_attempts, "grid library never became available");
    Err(ReadinessError::TimedOut {
        attempts: max_attempts,
    })
}
