//! Carrier integrations and their aggregation
//!
//! ## Key Components
//!
//! - [`Carrier`] - Trait every delivery-quote backend implements
//! - [`Carriers`] - Fans a [`Package`] out to all carriers and merges the
//!   [`DeliveryOption`]s they return
//! - [`RateTableCarrier`] - Built-in carrier quoting from a static rate table
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use delivery_options::carriers::{Carriers, CarriersConfig, Package};
//!
//! let carriers = Carriers::new(
//!     CarriersConfig::default().with_carrier(Arc::new(my_carrier)),
//! )?;
//! let options = carriers.query(&Package::new(100, 200, 300, 1500)).await?;
//! ```

mod aggregator;
mod rate_table;
mod traits;
mod types;

pub use aggregator::{Carriers, CarriersConfig, CarriersError};
pub use rate_table::RateTableCarrier;
pub use traits::{Carrier, CarrierError};
pub use types::{DeliveryOption, Package};
