//! Carrier fan-out and merge

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, warn};

use super::traits::Carrier;
use super::types::{DeliveryOption, Package};
use crate::observability::{CarrierOutcome, NoopMetrics, QueryMetrics, millis};

const DEFAULT_CARRIER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum CarriersError {
    /// Every carrier failed, returned nothing, or none are registered
    #[error("no offers found")]
    NoOffersFound,
    #[error("invalid carriers configuration: {0}")]
    InvalidConfig(String),
}

/// Everything needed to build a [`Carriers`] aggregator.
///
/// The default has no carriers, discards metrics through [`NoopMetrics`]
/// and bounds each carrier call to five seconds.
#[derive(Clone)]
pub struct CarriersConfig {
    /// Queried concurrently; results are merged in this order.
    pub carriers: Vec<Arc<dyn Carrier>>,
    pub metrics: Arc<dyn QueryMetrics>,
    pub carrier_timeout: Duration,
}

impl Default for CarriersConfig {
    fn default() -> Self {
        Self {
            carriers: Vec::new(),
            metrics: Arc::new(NoopMetrics),
            carrier_timeout: DEFAULT_CARRIER_TIMEOUT,
        }
    }
}

impl CarriersConfig {
    pub fn with_carrier(mut self, carrier: Arc<dyn Carrier>) -> Self {
        self.carriers.push(carrier);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn QueryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_carrier_timeout(mut self, timeout: Duration) -> Self {
        self.carrier_timeout = timeout;
        self
    }
}

/// Aggregates delivery options from every registered carrier.
///
/// A failing or slow carrier never fails the aggregate: its error is
/// logged, counted and dropped, and the remaining carriers' options are
/// returned. The carrier list is fixed at construction.
pub struct Carriers {
    carriers: Vec<Arc<dyn Carrier>>,
    metrics: Arc<dyn QueryMetrics>,
    carrier_timeout: Duration,
}

impl fmt::Debug for Carriers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.carriers.iter().map(|c| c.name()).collect();
        f.debug_struct("Carriers")
            .field("carriers", &names)
            .field("carrier_timeout", &self.carrier_timeout)
            .finish()
    }
}

impl Carriers {
    pub fn new(config: CarriersConfig) -> Result<Self, CarriersError> {
        if config.carrier_timeout.is_zero() {
            return Err(CarriersError::InvalidConfig(
                "carrier timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            carriers: config.carriers,
            metrics: config.metrics,
            carrier_timeout: config.carrier_timeout,
        })
    }

    /// Number of registered carriers
    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    pub fn carrier_timeout(&self) -> Duration {
        self.carrier_timeout
    }

    /// Query every carrier for `package` and merge the results.
    ///
    /// # Errors
    ///
    /// Returns [`CarriersError::NoOffersFound`] when the merged list is empty.
    pub async fn query(
        &self,
        package: &Package,
    ) -> Result<Vec<DeliveryOption>, CarriersError> {
        self.query_until(package, Instant::now() + self.carrier_timeout)
            .await
    }

    /// Same as [`Carriers::query`], but no carrier call outlives `deadline`.
    ///
    /// Each carrier is still bounded by the configured carrier timeout when
    /// that comes first. Dropping the returned future aborts all in-flight
    /// carrier calls.
    pub async fn query_until(
        &self,
        package: &Package,
        deadline: Instant,
    ) -> Result<Vec<DeliveryOption>, CarriersError> {
        self.metrics.query_received();

        let deadline = deadline.min(Instant::now() + self.carrier_timeout);

        let mut tasks = JoinSet::new();
        for (index, carrier) in self.carriers.iter().enumerate() {
            let carrier = Arc::clone(carrier);
            let metrics = Arc::clone(&self.metrics);
            let package = *package;
            tasks.spawn(async move {
                let options = query_carrier(carrier, metrics, package, deadline).await;
                (index, options)
            });
        }

        // Tasks finish in any order; slots restore registration order.
        let mut slots: Vec<Vec<DeliveryOption>> =
            std::iter::repeat_with(Vec::new).take(self.carriers.len()).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, options)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = options;
                    }
                }
                Err(join_error) => {
                    warn!(error = %join_error, "Carrier task did not complete");
                }
            }
        }

        let options: Vec<DeliveryOption> = slots.into_iter().flatten().collect();

        if options.is_empty() {
            debug!(carriers = self.carriers.len(), "No carrier produced delivery options");
            return Err(CarriersError::NoOffersFound);
        }

        debug!(
            carriers = self.carriers.len(),
            options = options.len(),
            "Merged delivery options"
        );
        Ok(options)
    }
}

/// Run one carrier under the deadline. Any failure yields an empty list.
async fn query_carrier(
    carrier: Arc<dyn Carrier>,
    metrics: Arc<dyn QueryMetrics>,
    package: Package,
    deadline: Instant,
) -> Vec<DeliveryOption> {
    let started = Instant::now();
    let call = AssertUnwindSafe(carrier.query(&package)).catch_unwind();

    let (outcome, options) = match timeout_at(deadline, call).await {
        Ok(Ok(Ok(options))) => (CarrierOutcome::Success, options),
        Ok(Ok(Err(carrier_error))) => {
            warn!(
                carrier = carrier.name(),
                error = %carrier_error,
                elapsed_ms = millis(started.elapsed()),
                "Carrier query failed, excluding it from results"
            );
            (CarrierOutcome::Failure, Vec::new())
        }
        Ok(Err(_panic)) => {
            error!(
                carrier = carrier.name(),
                elapsed_ms = millis(started.elapsed()),
                "Carrier panicked, excluding it from results"
            );
            (CarrierOutcome::Failure, Vec::new())
        }
        Err(_elapsed) => {
            warn!(
                carrier = carrier.name(),
                elapsed_ms = millis(started.elapsed()),
                "Carrier query timed out, excluding it from results"
            );
            (CarrierOutcome::TimedOut, Vec::new())
        }
    };

    metrics.carrier_outcome(carrier.name(), outcome, started.elapsed());
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carriers::CarrierError;
    use crate::money::Money;
    use crate::observability::Metrics;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct FixedCarrier {
        name: &'static str,
        options: Vec<DeliveryOption>,
    }

    #[async_trait]
    impl Carrier for FixedCarrier {
        fn name(&self) -> &str {
            self.name
        }

        async fn query(&self, _package: &Package) -> Result<Vec<DeliveryOption>, CarrierError> {
            Ok(self.options.clone())
        }
    }

    struct FailingCarrier;

    #[async_trait]
    impl Carrier for FailingCarrier {
        fn name(&self) -> &str {
            "failing"
        }

        async fn query(&self, _package: &Package) -> Result<Vec<DeliveryOption>, CarrierError> {
            Err(CarrierError::Unavailable("connection refused".into()))
        }
    }

    struct HangingCarrier;

    #[async_trait]
    impl Carrier for HangingCarrier {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn query(&self, _package: &Package) -> Result<Vec<DeliveryOption>, CarrierError> {
            std::future::pending().await
        }
    }

    struct SlowCarrier {
        delay: Duration,
        option: DeliveryOption,
    }

    #[async_trait]
    impl Carrier for SlowCarrier {
        fn name(&self) -> &str {
            "slow"
        }

        async fn query(&self, _package: &Package) -> Result<Vec<DeliveryOption>, CarrierError> {
            tokio::time::sleep(self.delay).await;
            Ok(vec![self.option.clone()])
        }
    }

    struct PanickingCarrier;

    #[async_trait]
    impl Carrier for PanickingCarrier {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn query(&self, _package: &Package) -> Result<Vec<DeliveryOption>, CarrierError> {
            panic!("carrier bug")
        }
    }

    fn option(provider: &str, total: i64) -> DeliveryOption {
        DeliveryOption {
            provider: provider.to_string(),
            cost: Money::new(total, "USD"),
            arrival: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn fixed(name: &'static str, options: Vec<DeliveryOption>) -> Arc<dyn Carrier> {
        Arc::new(FixedCarrier { name, options })
    }

    fn package() -> Package {
        Package::new(100, 200, 300, 1500)
    }

    #[tokio::test]
    async fn test_query_concatenates_in_registration_order() {
        let carriers = Carriers::new(
            CarriersConfig::default()
                .with_carrier(fixed("a", vec![option("a", 1), option("a", 2)]))
                .with_carrier(fixed("b", vec![option("b", 3)])),
        )
        .unwrap();

        let options = carriers.query(&package()).await.unwrap();

        assert_eq!(options, vec![option("a", 1), option("a", 2), option("b", 3)]);
    }

    #[tokio::test]
    async fn test_query_order_ignores_completion_order() {
        let carriers = Carriers::new(
            CarriersConfig::default()
                .with_carrier(Arc::new(SlowCarrier {
                    delay: Duration::from_millis(50),
                    option: option("slow", 1),
                }))
                .with_carrier(fixed("fast", vec![option("fast", 2)])),
        )
        .unwrap();

        let options = carriers.query(&package()).await.unwrap();

        assert_eq!(options, vec![option("slow", 1), option("fast", 2)]);
    }

    #[tokio::test]
    async fn test_query_without_carriers_finds_no_offers() {
        let carriers = Carriers::new(CarriersConfig::default()).unwrap();

        let result = carriers.query(&package()).await;

        assert!(matches!(result, Err(CarriersError::NoOffersFound)));
    }

    #[tokio::test]
    async fn test_query_all_failing_or_empty_finds_no_offers() {
        let carriers = Carriers::new(
            CarriersConfig::default()
                .with_carrier(Arc::new(FailingCarrier))
                .with_carrier(fixed("empty", Vec::new())),
        )
        .unwrap();

        let result = carriers.query(&package()).await;

        assert!(matches!(result, Err(CarriersError::NoOffersFound)));
    }

    #[tokio::test]
    async fn test_failing_carrier_is_isolated() {
        let carriers = Carriers::new(
            CarriersConfig::default()
                .with_carrier(fixed("a", vec![option("a", 1)]))
                .with_carrier(Arc::new(FailingCarrier))
                .with_carrier(Arc::new(PanickingCarrier))
                .with_carrier(fixed("b", vec![option("b", 2)])),
        )
        .unwrap();

        let options = carriers.query(&package()).await.unwrap();

        assert_eq!(options, vec![option("a", 1), option("b", 2)]);
    }

    #[tokio::test]
    async fn test_hanging_carrier_is_cut_off() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let carriers = Carriers::new(
            CarriersConfig::default()
                .with_carrier(Arc::new(HangingCarrier))
                .with_carrier(fixed("a", vec![option("a", 1)]))
                .with_carrier_timeout(Duration::from_millis(50))
                .with_metrics(metrics.clone()),
        )
        .unwrap();

        let options = carriers.query(&package()).await.unwrap();

        assert_eq!(options, vec![option("a", 1)]);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.carrier_timeouts, 1);
        assert_eq!(snapshot.carrier_successes, 1);
    }

    #[tokio::test]
    async fn test_caller_deadline_bounds_carriers() {
        let carriers = Carriers::new(
            CarriersConfig::default().with_carrier(Arc::new(SlowCarrier {
                delay: Duration::from_secs(2),
                option: option("slow", 1),
            })),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_millis(20);
        let result = carriers.query_until(&package(), deadline).await;

        assert!(matches!(result, Err(CarriersError::NoOffersFound)));
    }

    #[tokio::test]
    async fn test_each_query_counts_once() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let carriers = Carriers::new(
            CarriersConfig::default()
                .with_carrier(fixed("a", vec![option("a", 1)]))
                .with_carrier(Arc::new(FailingCarrier))
                .with_metrics(metrics.clone()),
        )
        .unwrap();

        carriers.query(&package()).await.unwrap();
        carriers.query(&package()).await.unwrap();
        assert_eq!(metrics.snapshot().queries, 2);
        assert_eq!(metrics.snapshot().carrier_failures, 2);

        let empty = Carriers::new(CarriersConfig::default().with_metrics(metrics.clone())).unwrap();
        assert!(empty.query(&package()).await.is_err());
        assert_eq!(metrics.snapshot().queries, 3);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = Carriers::new(CarriersConfig::default().with_carrier_timeout(Duration::ZERO));
        assert!(matches!(result, Err(CarriersError::InvalidConfig(_))));
    }

    #[test]
    fn test_len_reports_registered_carriers() {
        let carriers = Carriers::new(
            CarriersConfig::default()
                .with_carrier(fixed("a", Vec::new()))
                .with_carrier(fixed("b", Vec::new())),
        )
        .unwrap();

        assert_eq!(carriers.len(), 2);
        assert!(!carriers.is_empty());
        assert_eq!(carriers.carrier_timeout(), DEFAULT_CARRIER_TIMEOUT);
    }
}
