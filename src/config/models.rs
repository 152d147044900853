use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub carriers: CarrierSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9093))
}

/// Carrier aggregation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarrierSettings {
    /// Upper bound for a single carrier call
    #[serde(default = "default_carrier_timeout")]
    pub timeout: HumanDuration,
    /// Static rate-table carriers, queried in this order
    #[serde(default)]
    pub rate_tables: Vec<RateTableConfig>,
}

impl Default for CarrierSettings {
    fn default() -> Self {
        Self {
            timeout: default_carrier_timeout(),
            rate_tables: Vec::new(),
        }
    }
}

fn default_carrier_timeout() -> HumanDuration {
    HumanDuration::from_secs(5)
}

/// One static rate table
///
/// Weight limits are in grams, size limits in millimetres and prices in
/// the base unit of `currency`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateTableConfig {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub base: i64,
    #[serde(default)]
    pub per_kg: i64,
    #[serde(default = "default_max_weight")]
    pub max_weight: i64,
    #[serde(default = "default_max_side")]
    pub max_side: i64,
    #[serde(default = "default_transit_hours")]
    pub transit_hours: u32,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_max_weight() -> i64 {
    30_000 // 30 kg
}

fn default_max_side() -> i64 {
    1_500 // 1.5 m
}

fn default_transit_hours() -> u32 {
    72
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub log_format: LogFormat,
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
