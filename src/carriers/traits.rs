use async_trait::async_trait;
use thiserror::Error;

use super::types::{DeliveryOption, Package};

/// Errors a single carrier may report
#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("carrier unavailable: {0}")]
    Unavailable(String),
    #[error("package rejected: {0}")]
    Rejected(String),
    #[error("carrier internal error: {0}")]
    Internal(String),
}

/// A delivery-quote backend.
///
/// Implementations must not panic. On failure they return an error instead
/// of a partial list of options. Latency is not bounded here; the
/// aggregator applies its own timeout around every call.
#[async_trait]
pub trait Carrier: Send + Sync {
    /// Identifier used in logs and metrics
    fn name(&self) -> &str;

    /// Quote every delivery option this carrier has for `package`.
    async fn query(&self, package: &Package) -> Result<Vec<DeliveryOption>, CarrierError>;
}
