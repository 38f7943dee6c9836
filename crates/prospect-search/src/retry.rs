//! Bounded retry with exponential backoff for transient failures.
//!
//! The policy is global and shared: callers do not pick their own retry
//! behaviour. Every retryable failure also extends the process-wide
//! cooldown, so one caller's throttling slows everyone down and protects
//! the shared remote surface.

use crate::error::{Result, SearchError};
use crate::pacing::{jitter, Cooldown};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Wraps a single logical request with up to `max_attempts` tries.
pub(crate) struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    jitter_max: Duration,
    cooldown_period: Duration,
    cooldown: Arc<Cooldown>,
}

impl RetryPolicy {
    pub(crate) fn new(
        max_attempts: u32,
        base_delay: Duration,
        jitter_max: Duration,
        cooldown_period: Duration,
        cooldown: Arc<Cooldown>,
    ) -> Self {
        Self {
            // At least one attempt always happens.
            max_attempts: max_attempts.max(1),
            base_delay,
            jitter_max,
            cooldown_period,
            cooldown,
        }
    }

    /// Run `call`, retrying transient failures with exponentially growing
    /// delays until it succeeds or the attempt budget is spent.
    ///
    /// Non-retryable failures propagate immediately. Exhaustion wraps the
    /// final failure in [`SearchError::RetriesExhausted`] naming the
    /// operation. Every retryable failure, final or not, extends the shared
    /// cooldown deadline.
    pub(crate) async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            self.cooldown.extend(self.cooldown_period);
            attempt += 1;

            if attempt >= self.max_attempts {
                return Err(SearchError::RetriesExhausted {
                    operation,
                    attempts: attempt,
                    source: Box::new(err),
                });
            }

            let delay =
                self.base_delay * 2u32.saturating_pow(attempt - 1) + jitter(self.jitter_max);
            tracing::warn!(
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient failure, backing off before retry"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
