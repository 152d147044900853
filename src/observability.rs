//! Observability: query metrics and tracing subscriber setup

use std::fmt;
use std::time::Duration;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tracing_subscriber::{EnvFilter, prelude::*};

use crate::config::{LogFormat, TelemetryConfig};

/// How a single carrier invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierOutcome {
    Success,
    Failure,
    TimedOut,
}

impl CarrierOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarrierOutcome::Success => "success",
            CarrierOutcome::Failure => "failure",
            CarrierOutcome::TimedOut => "timed_out",
        }
    }
}

/// Sink for the aggregator's observations.
///
/// Implementations are shared across concurrent requests and must be safe
/// to call from many tasks at once.
pub trait QueryMetrics: Send + Sync {
    /// One aggregate query was received, regardless of its outcome.
    fn query_received(&self);

    /// One carrier finished (or was cut off) within an aggregate query.
    fn carrier_outcome(&self, _carrier: &str, _outcome: CarrierOutcome, _elapsed: Duration) {}
}

/// Discards every observation. Default sink for the aggregator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl QueryMetrics for NoopMetrics {
    fn query_received(&self) {}
}

/// Prometheus-backed query counters
///
/// Metrics are registered with a registry owned by this value and exported
/// in the Prometheus text format by [`Metrics::encode`].
///
/// - `delivery_option_queries_total`: aggregate queries received
/// - `delivery_option_carrier_queries_total{outcome}`: carrier calls by
///   `success`, `failure` or `timed_out`
pub struct Metrics {
    registry: Registry,
    queries: IntCounter,
    carrier_queries: IntCounterVec,
}

impl Metrics {
    /// Create and register the counters.
    ///
    /// # Errors
    ///
    /// Returns an error if a counter cannot be created or registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let queries = IntCounter::with_opts(Opts::new(
            "delivery_option_queries_total",
            "Delivery option queries received",
        ))?;
        registry.register(Box::new(queries.clone()))?;

        let carrier_queries = IntCounterVec::new(
            Opts::new(
                "delivery_option_carrier_queries_total",
                "Carrier calls made while answering delivery option queries, by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(carrier_queries.clone()))?;

        Ok(Self {
            registry,
            queries,
            carrier_queries,
        })
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let outcome = |o: CarrierOutcome| self.carrier_queries.with_label_values(&[o.as_str()]).get();
        MetricsSnapshot {
            queries: self.queries.get(),
            carrier_successes: outcome(CarrierOutcome::Success),
            carrier_failures: outcome(CarrierOutcome::Failure),
            carrier_timeouts: outcome(CarrierOutcome::TimedOut),
        }
    }

    /// Render every registered counter in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").field("snapshot", &self.snapshot()).finish()
    }
}

impl QueryMetrics for Metrics {
    fn query_received(&self) {
        self.queries.inc();
        tracing::debug!(counter = "delivery_option_queries_total", "Metric incremented");
    }

    fn carrier_outcome(&self, carrier: &str, outcome: CarrierOutcome, elapsed: Duration) {
        self.carrier_queries
            .with_label_values(&[outcome.as_str()])
            .inc();
        tracing::debug!(
            counter = "delivery_option_carrier_queries_total",
            carrier,
            outcome = outcome.as_str(),
            elapsed_ms = millis(elapsed),
            "Metric incremented"
        );
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queries: u64,
    pub carrier_successes: u64,
    pub carrier_failures: u64,
    pub carrier_timeouts: u64,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter.
pub fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let registry = tracing_subscriber::registry().with(filter);

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_count_queries_and_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.query_received();
        metrics.query_received();
        metrics.carrier_outcome("acme", CarrierOutcome::Success, Duration::from_millis(3));
        metrics.carrier_outcome("acme", CarrierOutcome::Failure, Duration::from_millis(3));
        metrics.carrier_outcome("slowpoke", CarrierOutcome::TimedOut, Duration::from_secs(5));

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                queries: 2,
                carrier_successes: 1,
                carrier_failures: 1,
                carrier_timeouts: 1,
            }
        );
    }

    #[test]
    fn test_encode_exports_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.query_received();
        metrics.carrier_outcome("acme", CarrierOutcome::TimedOut, Duration::from_secs(5));

        let text = metrics.encode().unwrap();
        assert!(text.contains("delivery_option_queries_total 1"));
        assert!(text.contains(r#"delivery_option_carrier_queries_total{outcome="timed_out"} 1"#));
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_noop_metrics_is_callable() {
        let metrics = NoopMetrics;
        metrics.query_received();
        metrics.carrier_outcome("acme", CarrierOutcome::Success, Duration::ZERO);
    }
}
