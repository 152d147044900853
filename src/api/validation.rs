//! Query parameter validation for the delivery options endpoint

use std::fmt;

use crate::carriers::Package;

pub const PARAM_WIDTH: &str = "width";
pub const PARAM_HEIGHT: &str = "height";
pub const PARAM_DEPTH: &str = "depth";
pub const PARAM_WEIGHT: &str = "weight";

/// Checked in this order; problem details list names in the same order.
pub const REQUIRED_PARAMS: [&str; 4] = [PARAM_WIDTH, PARAM_HEIGHT, PARAM_DEPTH, PARAM_WEIGHT];

/// Names of required parameters that were absent or not a base-10 `i64`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterErrors {
    pub missing: Vec<&'static str>,
    pub malformed: Vec<&'static str>,
}

impl ParameterErrors {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.malformed.is_empty()
    }
}

impl fmt::Display for ParameterErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The following parameters required for this request were not found: {}. \
             The following were malformed: {}",
            self.missing.join(","),
            self.malformed.join(",")
        )
    }
}

/// Build a [`Package`] from decoded query pairs.
///
/// The first occurrence of a repeated parameter wins. A parameter that is
/// present but empty counts as malformed.
pub fn parse_package(params: &[(String, String)]) -> Result<Package, ParameterErrors> {
    let mut errors = ParameterErrors::default();
    let mut values = [0i64; 4];

    for (slot, name) in values.iter_mut().zip(REQUIRED_PARAMS) {
        let Some((_, raw)) = params.iter().find(|(key, _)| key == name) else {
            errors.missing.push(name);
            continue;
        };

        match raw.parse::<i64>() {
            Ok(value) => *slot = value,
            Err(_) => errors.malformed.push(name),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let [width, height, depth, weight] = values;
    Ok(Package::new(width, height, depth, weight))
}
