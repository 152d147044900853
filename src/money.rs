//! Monetary amounts

use serde::{Deserialize, Serialize};

/// An amount of cash in the base (non-decimal) unit of its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub total: i64,
    /// ISO-4217 alphabetic code, e.g. `USD`.
    pub currency: String,
}

impl Money {
    pub fn new(total: i64, currency: impl Into<String>) -> Self {
        Self {
            total,
            currency: currency.into(),
        }
    }
}
