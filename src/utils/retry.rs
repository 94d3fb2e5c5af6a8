use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

// ============================================================================
// Exponential Backoff for Transient Failures
// ============================================================================
//
// Downstream calls are attempted once by default. Raising `max_attempts`
// retries errors that report themselves as transient, doubling the delay
// (by `multiplier`) up to `max_delay` between attempts.
//
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one. Values below 1 behave as 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::single_attempt()
    }
}

impl RetryConfig {
    /// One call, no retry.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }

    fn next_delay(&self, current: Duration) -> Duration {
        let scaled = current.as_secs_f64() * self.multiplier.max(1.0);
        // non-finite or out-of-range products fall back to the cap
        Duration::try_from_secs_f64(scaled).map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Whether an error is worth another attempt.
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

/// Run `operation` until it succeeds, fails permanently, or runs out of
/// attempts. The last error is returned unchanged.
pub async fn retry_on_transient<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if !error.is_transient() || attempt >= max_attempts {
            if max_attempts > 1 {
                tracing::debug!(
                    operation = operation_name,
                    attempt,
                    transient = error.is_transient(),
                    error = %error,
                    "Giving up"
                );
            }
            return Err(error);
        }

        tracing::warn!(
            operation = operation_name,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Transient failure, retrying"
        );
        sleep(delay).await;
        delay = config.next_delay(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError {
        transient: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error (transient: {})", self.transient)
        }
    }

    impl IsTransient for TestError {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_default_is_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), TestError> =
            retry_on_transient(&RetryConfig::default(), "probe", |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError { transient: true })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_on_transient(&fast_config(3), "probe", |_| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TestError { transient: true })
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), TestError> = retry_on_transient(&fast_config(5), "probe", |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TestError { transient: false })
            }
        })
        .await;

        assert!(matches!(result, Err(TestError { transient: false })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_is_capped() {
        let config = fast_config(4);
        let d1 = config.next_delay(Duration::from_millis(5));
        let d2 = config.next_delay(d1);
        let d3 = config.next_delay(d2);

        assert_eq!(d1, Duration::from_millis(10));
        assert_eq!(d2, Duration::from_millis(20));
        assert_eq!(d3, Duration::from_millis(20));
    }

    #[test]
    fn test_unbounded_multiplier_falls_back_to_cap() {
        let config = RetryConfig {
            multiplier: f64::INFINITY,
            ..fast_config(3)
        };
        assert_eq!(config.next_delay(Duration::from_millis(5)), Duration::from_millis(20));

        let config = RetryConfig {
            multiplier: f64::NAN,
            ..fast_config(3)
        };
        assert_eq!(config.next_delay(Duration::from_millis(5)), Duration::from_millis(5));
    }
}
