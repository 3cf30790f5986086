//! Bounded retry with fixed backoff
//!
//! The retry loop is an explicit state machine: the caller performs an
//! attempt, feeds the outcome to [`RetryState::record`], and either stops or
//! sleeps for the returned delay. Keeping the sleep outside the state machine
//! lets the enrichment task check for supersession between attempts and lets
//! tests drive it under tokio's paused clock.

use mel_common::config::EnrichmentConfig;
use std::time::Duration;

/// Default maximum number of attempts per enrichment request
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default fixed wait between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Retry policy (attempt budget + fixed delay, non-exponential)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Start a fresh attempt sequence
    pub fn start<E>(&self) -> RetryState<E> {
        RetryState {
            policy: *self,
            attempts: 0,
            last_error: None,
        }
    }
}

impl From<&EnrichmentConfig> for RetryPolicy {
    fn from(config: &EnrichmentConfig) -> Self {
        RetryPolicy::new(config.max_attempts, Duration::from_millis(config.retry_delay_ms))
    }
}

/// What the driver should do after an attempt
#[derive(Debug, PartialEq, Eq)]
pub enum RetryStep<T, E> {
    /// Attempt succeeded; stop
    Finished(T),
    /// Attempt failed; wait, then attempt again
    RetryAfter(Duration),
    /// Attempt failed and the budget is spent
    Exhausted(E),
}

/// Progress through one attempt sequence
#[derive(Debug)]
pub struct RetryState<E> {
    policy: RetryPolicy,
    attempts: u32,
    last_error: Option<E>,
}

impl<E> RetryState<E> {
    /// Attempts recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// 1-based number of the attempt about to be made
    pub fn next_attempt(&self) -> u32 {
        self.attempts + 1
    }

    pub fn last_error(&self) -> Option<&E> {
        self.last_error.as_ref()
    }

    /// Record an attempt outcome and decide the next step
    pub fn record<T>(&mut self, outcome: Result<T, E>) -> RetryStep<T, E> {
        self.attempts += 1;
        match outcome {
            Ok(value) => RetryStep::Finished(value),
            Err(err) if self.attempts >= self.policy.max_attempts => RetryStep::Exhausted(err),
            Err(err) => {
                self.last_error = Some(err);
                RetryStep::RetryAfter(self.policy.delay)
            }
        }
    }
}
