//! Retry mechanism with exponential backoff
//!
//! Implements retry logic for transient failures like network errors and 503 responses.
//! The delay before attempt `n + 1` is `base_delay * backoff_multiplier^(n - 1)`,
//! capped at `max_delay`, with optional jitter on top.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Retry policy shared by every request a client issues
///
/// Stateless: one policy value is read by any number of concurrent requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds
    pub base_delay_ms: u64,
    /// Growth factor applied per attempt
    pub backoff_multiplier: f64,
    /// Upper bound for a single delay, in milliseconds
    pub max_delay_ms: u64,
    /// Add up to one extra delay's worth of jitter
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            backoff_multiplier: 2.0,
            max_delay_ms: 30_000,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Policy that performs exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Delay to wait after the given failed attempt (1-indexed), without jitter
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let ms = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = ms.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".into()));
        }
        if !(self.backoff_multiplier >= 1.0) {
            return Err(Error::Config(
                "retry.backoff_multiplier must be >= 1.0".into(),
            ));
        }
        Ok(())
    }
}

/// Retry a fallible async operation with exponential backoff
///
/// The operation receives the 1-indexed attempt number. It is called at most
/// `policy.max_attempts` times; the last error is returned unchanged.
///
/// # Example
/// ```ignore
/// let result = retry_with_backoff(
///     &policy,
///     |_attempt| async { transport.send(request.clone()).await },
///     Error::is_retryable,
/// ).await;
/// ```
pub async fn retry_with_backoff<T, F, Fut, R>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: R,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
    R: Fn(&Error) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= policy.max_attempts || !is_retryable(&e) {
                    return Err(e);
                }

                let backoff = calculate_backoff(policy, attempt);
                tracing::debug!(
                    attempt = attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Retrying after transient error"
                );

                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// Calculate backoff duration, with jitter when enabled
fn calculate_backoff(policy: &RetryPolicy, attempt: u32) -> Duration {
    let delay = policy.delay_for(attempt);
    if !policy.jitter {
        return delay;
    }
    let delay_ms = delay.as_millis() as u64;
    Duration::from_millis(delay_ms + rand_jitter(delay_ms))
}

/// Generate pseudo-random jitter without external RNG dependency
fn rand_jitter(max: u64) -> u64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    nanos % max.max(1)
}

/// Retry policy builder for easy customization
#[derive(Debug, Clone)]
pub struct RetryBuilder {
    policy: RetryPolicy,
}

impl RetryBuilder {
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.policy.max_attempts = n;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.policy.base_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.policy.backoff_multiplier = multiplier;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn jitter(mut self, enabled: bool) -> Self {
        self.policy.jitter = enabled;
        self
    }

    pub fn build(self) -> RetryPolicy {
        self.policy
    }
}

impl Default for RetryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_for_is_exponential() {
        let policy = RetryBuilder::new()
            .base_delay(Duration::from_millis(100))
            .backoff_multiplier(2.0)
            .build();

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_for_fractional_multiplier() {
        let policy = RetryBuilder::new()
            .base_delay(Duration::from_millis(1000))
            .backoff_multiplier(1.5)
            .build();

        assert_eq!(policy.delay_for(2), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2250));
    }

    #[test]
    fn test_backoff_cap() {
        let policy = RetryBuilder::new()
            .max_attempts(10)
            .base_delay(Duration::from_millis(1000))
            .max_delay(Duration::from_millis(5000))
            .build();

        assert_eq!(policy.delay_for(10), Duration::from_millis(5000));
    }

    #[test]
    fn test_jitter_stays_within_one_delay() {
        let policy = RetryBuilder::new()
            .base_delay(Duration::from_millis(100))
            .jitter(true)
            .build();

        let b = calculate_backoff(&policy, 1);
        assert!(b.as_millis() >= 100 && b.as_millis() < 200);
    }

    #[test]
    fn test_validate() {
        assert!(RetryPolicy::default().validate().is_ok());
        assert!(RetryBuilder::new().max_attempts(0).build().validate().is_err());
        assert!(
            RetryBuilder::new()
                .backoff_multiplier(0.5)
                .build()
                .validate()
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let policy = RetryPolicy::default();
        let mut calls = 0;

        let result = retry_with_backoff(
            &policy,
            |_| {
                calls += 1;
                async { Ok::<_, Error>(42) }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_failure_waits_between_attempts() {
        let policy = RetryBuilder::new()
            .base_delay(Duration::from_millis(100))
            .backoff_multiplier(2.0)
            .build();
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();
        let start = tokio::time::Instant::now();

        let result = retry_with_backoff(
            &policy,
            |_| {
                let cc = call_count_clone.clone();
                async move {
                    let count = cc.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err(Error::Network("timeout".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            },
            Error::is_retryable,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        // 100ms after attempt 1, 200ms after attempt 2
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted() {
        let policy = RetryBuilder::new().max_attempts(2).build();
        let mut attempts_seen = Vec::new();

        let result: Result<()> = retry_with_backoff(
            &policy,
            |attempt| {
                attempts_seen.push(attempt);
                async { Err(Error::Network("always fails".to_string())) }
            },
            |_| true,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts_seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_retry_non_retryable() {
        let policy = RetryPolicy::default();
        let mut calls = 0;

        let result: Result<()> = retry_with_backoff(
            &policy,
            |_| {
                calls += 1;
                async { Err(Error::NotFound("not found".to_string())) }
            },
            Error::is_retryable,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1); // Should not retry
    }
}
