use std::sync::Arc;

use thiserror::Error;

use crate::carriers::{Carrier, Carriers, CarriersConfig, CarriersError, RateTableCarrier};
use crate::config::Config;
use crate::observability::Metrics;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to build carriers: {0}")]
    Carriers(#[from] CarriersError),
    #[error("failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub carriers: Arc<Carriers>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(carriers: Carriers, metrics: Arc<Metrics>) -> Self {
        Self {
            carriers: Arc::new(carriers),
            metrics,
        }
    }

    /// Register every configured rate table, in configuration order.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let metrics = Arc::new(Metrics::new()?);

        let carriers_config = config.carriers.rate_tables.iter().fold(
            CarriersConfig::default()
                .with_metrics(metrics.clone())
                .with_carrier_timeout(config.carriers.timeout.as_duration()),
            |acc, table| {
                let carrier: Arc<dyn Carrier> = Arc::new(RateTableCarrier::new(table.clone()));
                acc.with_carrier(carrier)
            },
        );

        Ok(Self::new(Carriers::new(carriers_config)?, metrics))
    }
}
