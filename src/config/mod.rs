//! Configuration management for the delivery options service
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use delivery_options::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `DELIVERY_OPTIONS__<section>__<key>`
//!
//! Examples:
//! - `DELIVERY_OPTIONS__SERVER__BIND_ADDR=127.0.0.1:9093`
//! - `DELIVERY_OPTIONS__CARRIERS__TIMEOUT=250ms`
//! - `DELIVERY_OPTIONS__TELEMETRY__LOG_FORMAT=json`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/delivery-options.toml`.
//! This can be overridden using the `DELIVERY_OPTIONS_CONFIG` environment
//! variable or the `--config` flag.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{
    CarrierSettings, Config, LogFormat, RateTableConfig, ServerConfig, TelemetryConfig,
};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// `path` overrides `DELIVERY_OPTIONS_CONFIG` and the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or fails
    /// validation.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
