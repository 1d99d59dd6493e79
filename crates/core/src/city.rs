//! Supported cities and their synthetic pollution profiles.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A city the prediction models are trained for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Mumbai,
    Delhi,
}

impl City {
    /// All supported cities, in training order.
    pub const ALL: [City; 2] = [City::Mumbai, City::Delhi];

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Mumbai => "mumbai",
            City::Delhi => "delhi",
        }
    }

    /// Typical pollution level before seasonal and yearly factors.
    pub fn base_pollution(&self) -> f64 {
        match self {
            City::Mumbai => 80.0,
            City::Delhi => 150.0,
        }
    }

    /// Plausible `(min, max)` monthly pollution level.
    pub fn pollution_bounds(&self) -> (f64, f64) {
        match self {
            City::Mumbai => (40.0, 180.0),
            City::Delhi => (80.0, 400.0),
        }
    }
}

impl core::fmt::Display for City {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is exact: city keys are lowercase.
impl FromStr for City {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mumbai" => Ok(City::Mumbai),
            "delhi" => Ok(City::Delhi),
            other => Err(CoreError::unknown_city(other)),
        }
    }
}
