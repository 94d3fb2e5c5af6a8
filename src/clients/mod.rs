use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Url;

use crate::domain::customer::Customer;
use crate::domain::inventory::Availability;
use crate::metrics::Metrics;
use crate::utils::{retry_on_transient, CircuitBreaker, CircuitBreakerConfig, IsTransient, RetryConfig};

// ============================================================================
// Remote Oracles - customer directory and inventory ledger
// ============================================================================
//
// Both downstream services are untrusted and fallible. Each adapter exposes
// a raw call returning `Result<_, TransportError>` and a provided method that
// collapses it into a plain boolean: any failure means "nonexistent" or
// "unavailable". The raw error is logged at the collapse point and goes no
// further.
//
// ============================================================================

pub mod customer;
pub mod inventory;

pub use customer::HttpCustomerDirectory;
pub use inventory::HttpInventory;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("{service} did not answer within {timeout_ms} ms")]
    Timeout { service: String, timeout_ms: u64 },

    #[error("could not reach {service}: {message}")]
    Connect { service: String, message: String },

    #[error("{service} responded with HTTP {status}")]
    Status { service: String, status: u16 },

    #[error("malformed response from {service}: {message}")]
    Decode { service: String, message: String },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("circuit breaker open for {0}")]
    CircuitOpen(String),

    #[error("http client error: {0}")]
    Client(String),
}

impl TransportError {
    pub fn from_reqwest(service: &str, timeout: Duration, error: reqwest::Error) -> Self {
        let service = service.to_string();
        if error.is_timeout() {
            TransportError::Timeout { service, timeout_ms: millis(timeout) }
        } else if let Some(status) = error.status() {
            TransportError::Status { service, status: status.as_u16() }
        } else if error.is_connect() {
            TransportError::Connect { service, message: error.to_string() }
        } else if error.is_decode() {
            TransportError::Decode { service, message: error.to_string() }
        } else {
            TransportError::Client(error.to_string())
        }
    }
}

impl IsTransient for TransportError {
    fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout { .. } | TransportError::Connect { .. } => true,
            TransportError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[async_trait]
pub trait RemoteDirectory: Send + Sync {
    /// `Ok(None)` when the directory answers that the customer does not exist.
    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>, TransportError>;

    /// Fail-closed existence check; never errors.
    async fn exists(&self, customer_id: &str) -> bool {
        match self.fetch_customer(customer_id).await {
            Ok(customer) => customer.is_some(),
            Err(error) => {
                tracing::warn!(
                    customer_id,
                    error = %error,
                    "Customer lookup failed, treating customer as nonexistent"
                );
                false
            }
        }
    }
}

#[async_trait]
pub trait RemoteInventory: Send + Sync {
    async fn check_availability(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<Availability, TransportError>;

    /// Fail-closed availability check; never errors.
    async fn is_available(&self, product_id: &str, quantity: u32) -> bool {
        match self.check_availability(product_id, quantity).await {
            Ok(availability) => availability.available,
            Err(error) => {
                tracing::warn!(
                    product_id,
                    quantity,
                    error = %error,
                    "Availability check failed, treating product as unavailable"
                );
                false
            }
        }
    }
}

// ============================================================================
// Shared call policy for HTTP adapters
// ============================================================================

/// Where a downstream service lives and how hard to try reaching it.
#[derive(Debug, Clone)]
pub struct RemoteEndpoint {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub breaker: CircuitBreakerConfig,
}

impl RemoteEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(2),
            retry: RetryConfig::default(),
            breaker: CircuitBreakerConfig::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }

    pub(crate) fn parse_base_url(&self) -> Result<Url, TransportError> {
        Url::parse(&self.base_url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))
    }
}

/// Breaker, retry, per-attempt timeout and metrics around one downstream
/// service.
pub(crate) struct RemoteCall {
    service: &'static str,
    timeout: Duration,
    retry: RetryConfig,
    breaker: CircuitBreaker,
    metrics: Option<Arc<Metrics>>,
}

impl RemoteCall {
    pub(crate) fn new(service: &'static str, endpoint: &RemoteEndpoint) -> Self {
        Self {
            service,
            timeout: endpoint.timeout,
            retry: endpoint.retry.clone(),
            breaker: CircuitBreaker::new(service, endpoint.breaker.clone()),
            metrics: None,
        }
    }

    pub(crate) fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.breaker = self.breaker.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    pub(crate) fn transport_error(&self, error: reqwest::Error) -> TransportError {
        TransportError::from_reqwest(self.service, self.timeout, error)
    }

    #[cfg(test)]
    pub(crate) fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub(crate) async fn run<F, Fut, T>(&self, mut attempt: F) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let started = Instant::now();

        if !self.breaker.try_acquire().await {
            self.observe("circuit_open", started);
            return Err(TransportError::CircuitOpen(self.service.to_string()));
        }

        let timeout = self.timeout;
        let service = self.service;
        let result = retry_on_transient(&self.retry, service, |_| {
            let call = attempt();
            async move {
                match tokio::time::timeout(timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout {
                        service: service.to_string(),
                        timeout_ms: millis(timeout),
                    }),
                }
            }
        })
        .await;

        match &result {
            Ok(_) => {
                self.breaker.record_success().await;
                self.observe("ok", started);
            }
            Err(error) => {
                self.breaker.record_failure().await;
                self.observe("error", started);
                tracing::debug!(service, error = %error, "Remote call failed");
            }
        }

        result
    }

    fn observe(&self, outcome: &str, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_remote_call(self.service, outcome, started.elapsed().as_secs_f64());
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Append path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, TransportError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::CircuitState;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FailingDirectory;

    #[async_trait]
    impl RemoteDirectory for FailingDirectory {
        async fn fetch_customer(&self, _customer_id: &str) -> Result<Option<Customer>, TransportError> {
            Err(TransportError::Decode {
                service: "customer".to_string(),
                message: "unexpected EOF".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_directory_error_collapses_to_false() {
        assert!(!FailingDirectory.exists("CUST001").await);
    }

    #[test]
    fn test_transient_classification() {
        let timeout = TransportError::Timeout { service: "inventory".into(), timeout_ms: 10 };
        let unavailable = TransportError::Status { service: "inventory".into(), status: 503 };
        let bad_request = TransportError::Status { service: "inventory".into(), status: 400 };
        let open = TransportError::CircuitOpen("inventory".into());

        assert!(timeout.is_transient());
        assert!(unavailable.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!open.is_transient());
    }

    #[test]
    fn test_endpoint_url_encodes_segments() {
        let base = Url::parse("http://localhost:8083/").unwrap();
        let url = endpoint_url(&base, &["api", "customers", "CUST 001/x"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8083/api/customers/CUST%20001%2Fx");

        let nested = Url::parse("http://gateway/customer-svc").unwrap();
        let url = endpoint_url(&nested, &["api", "customers", "C1"]).unwrap();
        assert_eq!(url.as_str(), "http://gateway/customer-svc/api/customers/C1");
    }

    #[test]
    fn test_timeout_millis_saturate() {
        assert_eq!(millis(Duration::from_millis(2000)), 2000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_invalid_base_url_is_reported() {
        let endpoint = RemoteEndpoint::new("not a url");
        assert!(matches!(endpoint.parse_base_url(), Err(TransportError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let endpoint = RemoteEndpoint::new("http://unused").with_timeout(Duration::from_millis(20));
        let call = RemoteCall::new("inventory", &endpoint);

        let result: Result<(), TransportError> = call
            .run(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(TransportError::Timeout { timeout_ms: 20, .. })));
    }

    #[tokio::test]
    async fn test_open_breaker_short_circuits() {
        let endpoint = RemoteEndpoint::new("http://unused").with_breaker(CircuitBreakerConfig {
            failure_threshold: 1,
            reset_timeout: Duration::from_secs(60),
            success_threshold: 1,
        });
        let metrics = Arc::new(Metrics::new().unwrap());
        let call = RemoteCall::new("inventory", &endpoint).with_metrics(metrics.clone());
        let attempts = AtomicU32::new(0);

        for _ in 0..3 {
            let _: Result<(), TransportError> = call
                .run(|| {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    async {
                        Err(TransportError::Connect {
                            service: "inventory".into(),
                            message: "refused".into(),
                        })
                    }
                })
                .await;
        }

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(call.breaker().state().await, CircuitState::Open);
        assert_eq!(
            metrics.remote_calls.with_label_values(&["inventory", "circuit_open"]).get(),
            2
        );
    }
}
