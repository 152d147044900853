//! Carrier backed by a static rate table from configuration

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use super::traits::{Carrier, CarrierError};
use super::types::{DeliveryOption, Package};
use crate::config::RateTableConfig;
use crate::money::Money;

const GRAMS_PER_KG: i64 = 1000;

/// Quotes a flat base price plus a per-started-kilogram rate.
///
/// Packages outside the table's weight or size limits get no options.
/// Packages with a non-positive dimension or weight are rejected.
#[derive(Debug, Clone)]
pub struct RateTableCarrier {
    table: RateTableConfig,
    clock: fn() -> DateTime<Utc>,
}

impl RateTableCarrier {
    pub fn new(table: RateTableConfig) -> Self {
        Self {
            table,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock, e.g. to make arrival times deterministic.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn price(&self, weight: i64) -> Option<i64> {
        let started_kgs = weight.checked_add(GRAMS_PER_KG - 1)? / GRAMS_PER_KG;
        self.table
            .per_kg
            .checked_mul(started_kgs)?
            .checked_add(self.table.base)
    }

    fn arrival(&self) -> Result<DateTime<Utc>, CarrierError> {
        let eta = (self.clock)()
            .checked_add_signed(TimeDelta::hours(i64::from(self.table.transit_hours)))
            .ok_or_else(|| CarrierError::Internal("arrival out of range".into()))?;
        eta.duration_trunc(TimeDelta::hours(1))
            .map_err(|e| CarrierError::Internal(format!("cannot round arrival: {}", e)))
    }
}

#[async_trait]
impl Carrier for RateTableCarrier {
    fn name(&self) -> &str {
        &self.table.name
    }

    async fn query(&self, package: &Package) -> Result<Vec<DeliveryOption>, CarrierError> {
        let sides = [package.width, package.height, package.depth];
        if sides.iter().any(|side| *side <= 0) || package.weight <= 0 {
            return Err(CarrierError::Rejected(format!(
                "dimensions and weight must be positive: {:?}",
                package
            )));
        }

        if package.weight > self.table.max_weight || package.longest_side() > self.table.max_side
        {
            return Ok(Vec::new());
        }

        let total = self.price(package.weight).ok_or_else(|| {
            CarrierError::Rejected(format!("price overflows for weight {}", package.weight))
        })?;

        Ok(vec![DeliveryOption {
            provider: self.table.name.clone(),
            cost: Money::new(total, self.table.currency.clone()),
            arrival: self.arrival()?,
        }])
    }
}
