//! Bounded retry with exponential backoff for transport calls.
//!
//! Only [`TransportError::is_retryable`] errors are retried. A rejection from the gateway is a verdict on the
//! transaction, sending it again will not change it.

use std::future::Future;
use std::time::Duration;

use crate::TransportError;

// Use tokio::time::Instant for tests (allows time manipulation)
// Use std::time::Instant for production (more efficient)
#[cfg(not(test))]
type InstantProvider = std::time::Instant;

#[cfg(test)]
type InstantProvider = tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, the first one included.
    pub max_attempts: usize,
    /// Delay before the first retry. Doubles for every subsequent retry.
    pub initial_delay: Duration,
    /// Maximum backoff delay (cap for exponential growth)
    pub max_backoff: Duration,
    /// Interval for logging warnings during retries
    pub log_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            log_interval: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// A single attempt.
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, ..Default::default() }
    }
}

/// State tracker for retry attempts
pub struct RetryState {
    config: RetryConfig,
    start_time: InstantProvider,
    last_log_time: Option<InstantProvider>,
    retry_count: usize,
}

impl std::fmt::Debug for RetryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryState")
            .field("config", &self.config)
            .field("retry_count", &self.retry_count)
            .finish()
    }
}

impl RetryState {
    pub fn new(config: RetryConfig) -> Self {
        Self { config, start_time: InstantProvider::now(), last_log_time: None, retry_count: 0 }
    }

    /// No attempt left after the one that just failed.
    pub fn is_exhausted(&self) -> bool {
        self.retry_count + 1 >= self.config.max_attempts
    }

    /// Delay before the current retry: `initial_delay * 2^(retry_count - 1)`, capped at `max_backoff`.
    pub fn next_delay(&self) -> Duration {
        // cap exponent to prevent overflow
        let exponent = self.retry_count.saturating_sub(1).min(16) as u32;
        self.config.initial_delay.saturating_mul(2_u32.saturating_pow(exponent)).min(self.config.max_backoff)
    }

    /// Check if we should log this retry attempt (throttled logging)
    pub fn should_log(&mut self) -> bool {
        match self.last_log_time {
            Some(last) if last.elapsed() < self.config.log_interval => false,
            _ => {
                self.last_log_time = Some(InstantProvider::now());
                true
            }
        }
    }

    /// Increment retry counter and return current count
    pub fn increment_retry(&mut self) -> usize {
        self.retry_count += 1;
        self.retry_count
    }

    pub fn get_retry_count(&self) -> usize {
        self.retry_count
    }

    /// Get elapsed time since the first attempt
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Records a failed attempt and sleeps for the backoff delay. Returns the error back when it should not be
    /// retried.
    pub async fn backoff(&mut self, operation: &str, error: TransportError) -> Result<(), TransportError> {
        if !error.is_retryable() || self.is_exhausted() {
            return Err(error);
        }
        let attempt = self.increment_retry();
        let delay = self.next_delay();
        if self.should_log() {
            tracing::warn!(
                operation,
                attempt,
                max_attempts = self.config.max_attempts,
                delay = ?delay,
                elapsed = ?self.elapsed(),
                "🔄 {error}, retrying"
            );
        } else {
            tracing::debug!(operation, attempt, delay = ?delay, "🔄 {error}, retrying");
        }
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Runs `f` until it succeeds, fails with a non-retryable error, or runs out of attempts.
pub async fn retry<T, F, Fut>(config: &RetryConfig, operation: &str, mut f: F) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut state = RetryState::new(config.clone());
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(error) => state.backoff(operation, error).await?,
        }
    }
}
