use std::time::Duration;

use crate::error::{
    CrawlError,
    CrawlResult,
};

/// Retry policy for transient GitHub API failures.
///
/// Only `Network` and `Api` errors are retried; everything else is
/// deterministic and fails the operation immediately.
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            exponential_backoff: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_delay: Duration, exponential_backoff: bool) -> Self {
        Self {
            max_retries,
            initial_delay,
            exponential_backoff,
        }
    }

    pub async fn retry<F, Fut, T>(&self, operation: F) -> CrawlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = CrawlResult<T>>,
    {
        let mut delay = self.initial_delay;
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 < self.max_retries => match e {
                    CrawlError::Network(_) | CrawlError::Api(_) => {
                        tracing::debug!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying after transient failure"
                        );
                        last_error = Some(e);
                        tokio::time::sleep(delay).await;
                        if self.exponential_backoff {
                            delay *= 2;
                        }
                    }
                    _ => return Err(e),
                },
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CrawlError::Network("Retry budget exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    use super::*;

    #[tokio::test]
    async fn test_retry_success_on_first_attempt() {
        let policy = RetryPolicy::default();
        let attempts = AtomicUsize::new(0);

        let result = policy
            .retry(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CrawlError>(42)
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_eventual_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), false);
        let attempts = AtomicUsize::new(0);

        let result = policy
            .retry(|| async {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(CrawlError::Network("connection reset".to_string()))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausts_budget() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1), false);
        let attempts = AtomicUsize::new(0);

        let result: CrawlResult<()> = policy
            .retry(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CrawlError::Api("boom".to_string()))
            })
            .await;

        assert!(matches!(result, Err(CrawlError::Api(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_on_config_errors() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), false);
        let attempts = AtomicUsize::new(0);

        let result: CrawlResult<()> = policy
            .retry(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CrawlError::InvalidConfig("bad token".to_string()))
            })
            .await;

        assert!(matches!(result, Err(CrawlError::InvalidConfig(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
