use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - Order creation, validation failures and status transitions
// - Remote oracle calls (outcome and latency per downstream service)
// - Circuit breaker state transitions
//
// Everything is registered on a private registry rendered at /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Order lifecycle
    pub orders_created: IntCounter,
    pub order_validation_failures: IntCounter,
    pub order_status_transitions: IntCounterVec,
    pub orders_stored: IntGauge,

    // Remote oracles
    pub remote_calls: IntCounterVec,
    pub remote_call_duration: HistogramVec,

    // Circuit breakers
    pub circuit_breaker_transitions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let order_validation_failures = IntCounter::new(
            "order_validation_failures_total",
            "Order creation requests rejected by validation",
        )?;
        registry.register(Box::new(order_validation_failures.clone()))?;

        let order_status_transitions = IntCounterVec::new(
            Opts::new("order_status_transitions_total", "Order status changes"),
            &["from", "to"],
        )?;
        registry.register(Box::new(order_status_transitions.clone()))?;

        let orders_stored = IntGauge::new("orders_stored", "Orders currently held by the store")?;
        registry.register(Box::new(orders_stored.clone()))?;

        let remote_calls = IntCounterVec::new(
            Opts::new("remote_calls_total", "Calls to downstream services by outcome"),
            &["service", "outcome"],
        )?;
        registry.register(Box::new(remote_calls.clone()))?;

        let remote_call_duration = HistogramVec::new(
            HistogramOpts::new("remote_call_duration_seconds", "Downstream call latency")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["service"],
        )?;
        registry.register(Box::new(remote_call_duration.clone()))?;

        let circuit_breaker_transitions = IntCounterVec::new(
            Opts::new("circuit_breaker_transitions_total", "Circuit breaker state transitions"),
            &["service", "from_state", "to_state"],
        )?;
        registry.register(Box::new(circuit_breaker_transitions.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            order_validation_failures,
            order_status_transitions,
            orders_stored,
            remote_calls,
            remote_call_duration,
            circuit_breaker_transitions,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition format, as served at /metrics.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn record_status_transition(&self, from: &str, to: &str) {
        self.order_status_transitions.with_label_values(&[from, to]).inc();
    }

    /// `outcome` is one of `ok`, `error`, `circuit_open`.
    pub fn record_remote_call(&self, service: &str, outcome: &str, duration_secs: f64) {
        self.remote_calls.with_label_values(&[service, outcome]).inc();
        self.remote_call_duration
            .with_label_values(&[service])
            .observe(duration_secs);
    }

    pub fn record_circuit_transition(&self, service: &str, from: &str, to: &str) {
        self.circuit_breaker_transitions
            .with_label_values(&[service, from, to])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_remote_call() {
        let metrics = Metrics::new().unwrap();
        metrics.record_remote_call("customer", "ok", 0.02);
        metrics.record_remote_call("customer", "error", 0.5);
        metrics.record_remote_call("inventory", "ok", 0.01);

        assert_eq!(metrics.remote_calls.with_label_values(&["customer", "ok"]).get(), 1);
        assert_eq!(metrics.remote_calls.with_label_values(&["customer", "error"]).get(), 1);
        assert_eq!(
            metrics
                .remote_call_duration
                .with_label_values(&["customer"])
                .get_sample_count(),
            2
        );
    }

    #[test]
    fn test_render_contains_registered_families() {
        let metrics = Metrics::new().unwrap();
        metrics.orders_created.inc();
        metrics.record_status_transition("PENDING", "COMPLETED");

        let text = metrics.render().unwrap();
        assert!(text.contains("orders_created_total 1"));
        assert!(text.contains("order_status_transitions_total{from=\"PENDING\",to=\"COMPLETED\"} 1"));
    }
}
