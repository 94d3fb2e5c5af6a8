use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::metrics::Metrics;

// ============================================================================
// Circuit Breaker per downstream service
// ============================================================================
//
// States:
// - Closed: calls pass through, consecutive failures are counted
// - Open: calls are refused until `reset_timeout` has elapsed
// - HalfOpen: calls pass through; `success_threshold` successes close the
//   circuit, any failure reopens it
//
// Callers ask `try_acquire` before a call and report the outcome with
// `record_success` / `record_failure`.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// How long an open circuit refuses calls.
    pub reset_timeout: Duration,
    /// Successes in half-open needed to close again.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
            success_threshold: 1,
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
}

pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
    metrics: Option<Arc<Metrics>>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                half_open_successes: 0,
                opened_at: None,
            }),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `false` while the circuit is open and the reset timeout has not passed.
    pub async fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().await;

        if inner.state != CircuitState::Open {
            return true;
        }

        let cooled_down = inner
            .opened_at
            .map_or(true, |opened| opened.elapsed() >= self.config.reset_timeout);

        if cooled_down {
            inner.half_open_successes = 0;
            self.transition(&mut inner, CircuitState::HalfOpen);
            true
        } else {
            false
        }
    }

    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;

        match inner.state {
            CircuitState::Closed => inner.consecutive_failures = 0,
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.success_threshold.max(1) {
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    self.transition(&mut inner, CircuitState::Closed);
                }
            }
            // a call admitted before the circuit opened
            CircuitState::Open => {}
        }
    }

    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures += 1;

        match inner.state {
            CircuitState::Closed => {
                if inner.consecutive_failures >= self.config.failure_threshold.max(1) {
                    inner.opened_at = Some(Instant::now());
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => {
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, CircuitState::Open);
            }
            CircuitState::Open => inner.opened_at = Some(Instant::now()),
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures = 0;
        inner.half_open_successes = 0;
        inner.opened_at = None;
        self.transition(&mut inner, CircuitState::Closed);
    }

    fn transition(&self, inner: &mut BreakerInner, to: CircuitState) {
        let from = inner.state;
        if from == to {
            return;
        }
        inner.state = to;

        match to {
            CircuitState::Open => tracing::warn!(
                service = %self.name,
                failures = inner.consecutive_failures,
                "Circuit breaker opened"
            ),
            _ => tracing::info!(
                service = %self.name,
                from = from.as_str(),
                to = to.as_str(),
                "Circuit breaker state changed"
            ),
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_circuit_transition(&self.name, from.as_str(), to.as_str());
        }
    }
}
