use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A physical package to be delivered.
///
/// Dimensions are in millimetres and weight in grams. No range checks are
/// made here; carriers decide whether a package is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub width: i64,
    pub height: i64,
    pub depth: i64,
    pub weight: i64,
}

impl Package {
    pub fn new(width: i64, height: i64, depth: i64, weight: i64) -> Self {
        Self {
            width,
            height,
            depth,
            weight,
        }
    }

    /// Length of the longest side in millimetres
    pub fn longest_side(&self) -> i64 {
        self.width.max(self.height).max(self.depth)
    }
}

/// One way a carrier offers to deliver a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOption {
    /// Name of the carrier making the offer
    pub provider: String,
    pub cost: Money,
    /// Estimated arrival, accurate to within six hours
    pub arrival: DateTime<Utc>,
}
