use super::models::{Config, RateTableConfig};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Carrier timeout must be greater than zero")]
    ZeroCarrierTimeout,

    #[error("Rate table #{index} has an empty name")]
    EmptyRateTableName { index: usize },

    #[error("Rate table name '{name}' is used more than once")]
    DuplicateRateTableName { name: String },

    #[error("Rate table '{table}' has invalid currency '{currency}', expected an ISO-4217 code")]
    InvalidCurrency { table: String, currency: String },

    #[error("Rate table '{table}' has negative {field}: {value}")]
    NegativeRate {
        table: String,
        field: &'static str,
        value: i64,
    },

    #[error("Rate table '{table}' limit {field} must be positive: {value}")]
    InvalidLimit {
        table: String,
        field: &'static str,
        value: i64,
    },

    #[error("Rate table '{table}' transit_hours must be positive")]
    ZeroTransitHours { table: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.carriers.timeout.is_zero() {
        return Err(ValidationError::ZeroCarrierTimeout);
    }

    validate_rate_tables(&config.carriers.rate_tables)
}

/// Rate-table names identify carriers in responses and logs, so they must
/// be unique.
fn validate_rate_tables(tables: &[RateTableConfig]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();

    for (index, table) in tables.iter().enumerate() {
        if table.name.trim().is_empty() {
            return Err(ValidationError::EmptyRateTableName { index });
        }
        if !seen.insert(table.name.as_str()) {
            return Err(ValidationError::DuplicateRateTableName {
                name: table.name.clone(),
            });
        }
        validate_rate_table(table)?;
    }

    Ok(())
}

fn validate_rate_table(table: &RateTableConfig) -> Result<(), ValidationError> {
    if !is_currency_code(&table.currency) {
        return Err(ValidationError::InvalidCurrency {
            table: table.name.clone(),
            currency: table.currency.clone(),
        });
    }

    for (field, value) in [("base", table.base), ("per_kg", table.per_kg)] {
        if value < 0 {
            return Err(ValidationError::NegativeRate {
                table: table.name.clone(),
                field,
                value,
            });
        }
    }

    for (field, value) in [("max_weight", table.max_weight), ("max_side", table.max_side)] {
        if value <= 0 {
            return Err(ValidationError::InvalidLimit {
                table: table.name.clone(),
                field,
                value,
            });
        }
    }

    if table.transit_hours == 0 {
        return Err(ValidationError::ZeroTransitHours {
            table: table.name.clone(),
        });
    }

    Ok(())
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}
