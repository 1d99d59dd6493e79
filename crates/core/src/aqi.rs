//! Air Quality Index (AQI) buckets and their display table.

use serde::{Deserialize, Serialize};

/// Severity bucket reported by the air-quality provider.
///
/// The provider reports 1..=5; anything outside 1..=4 is treated as the worst
/// bucket, so the type accepts any integer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirQualityIndex(i64);

impl AirQualityIndex {
    /// Highest bucket on the provider's scale.
    pub const MAX: AirQualityIndex = AirQualityIndex(5);

    /// Substituted whenever a live reading cannot be obtained ("Poor").
    pub const FALLBACK: AirQualityIndex = AirQualityIndex(3);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn category(&self) -> AqiCategory {
        AqiCategory::from_index(self.0)
    }

    /// One-step worsening heuristic used as tomorrow's outlook.
    ///
    /// `min(5, today + 1)`; not a forecast model.
    pub fn tomorrow(&self) -> AirQualityIndex {
        AirQualityIndex(self.0.saturating_add(1).min(Self::MAX.0))
    }
}

impl From<i64> for AirQualityIndex {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for AirQualityIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display category for an AQI bucket.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
}

impl AqiCategory {
    /// Total mapping from an index to its category.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => AqiCategory::Good,
            2 => AqiCategory::Moderate,
            3 => AqiCategory::Poor,
            4 => AqiCategory::VeryPoor,
            _ => AqiCategory::Severe,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
        }
    }

    pub fn range(&self) -> &'static str {
        match self {
            AqiCategory::Good => "0-50",
            AqiCategory::Moderate => "51-100",
            AqiCategory::Poor => "101-200",
            AqiCategory::VeryPoor => "201-300",
            AqiCategory::Severe => "300+",
        }
    }

    /// `(label, range)` pair as shown in notifications.
    pub fn display(&self) -> (&'static str, &'static str) {
        (self.label(), self.range())
    }
}

impl core::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.label(), self.range())
    }
}
