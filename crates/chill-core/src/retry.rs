use std::future::Future;
use std::time::Duration;

use crate::config::PaginationConfig;
use crate::error::Result;

/// Fixed-delay retry policy: `max_retries` extra attempts, `delay` between each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Worst-case time spent waiting between attempts.
    pub fn total_delay(&self) -> Duration {
        self.delay * self.max_retries as u32
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Retry an async operation with a fixed delay between attempts.
/// Non-transient errors are returned immediately.
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if !e.is_transient() || attempt == policy.max_retries {
                    return Err(e);
                }
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "fetch failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChillError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast(max_retries: usize) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    fn unavailable() -> ChillError {
        ChillError::Server {
            status: 503,
            body: "unavailable".into(),
        }
    }

    #[test]
    fn test_default_policy_is_three_retries_half_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_millis(500));
        assert_eq!(policy.total_delay(), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let attempts = AtomicUsize::new(0);
        let result = with_retry(fast(3), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ChillError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_transient_error_no_retry() {
        let attempts = AtomicUsize::new(0);
        let result = with_retry(fast(3), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<i32, _>(ChillError::Server {
                    status: 404,
                    body: "not found".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_error_retries_up_to_max() {
        let attempts = AtomicUsize::new(0);
        let result = with_retry(fast(3), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(unavailable()) }
        })
        .await;
        assert!(result.is_err());
        // initial attempt + 3 retries
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_transient_error_succeeds_on_retry() {
        let attempts = AtomicUsize::new(0);
        let result = with_retry(fast(3), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err::<i32, _>(unavailable())
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fixed_delay_between_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_millis(20));
        let start = std::time::Instant::now();
        let _ = with_retry(policy, || async { Err::<(), _>(unavailable()) }).await;
        // two waits of 20ms each, no doubling
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
