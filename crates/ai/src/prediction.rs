//! Prediction series per analysis axis.
//!
//! Each axis point gets a synthetic feature row built from fixed
//! representative conditions, is run through the city's model and reported
//! next to a fixed mitigation scenario (30% lower).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{FeatureVector, HourProfile, YEARS};
use crate::result::AiError;
use crate::trainer::ModelRegistry;

/// Share of the baseline left in the mitigation scenario.
pub const MITIGATION_FACTOR: f64 = 0.7;

/// Reduction label reported alongside every series.
pub const REDUCTION_LABEL: &str = "30%";

const WIND_SPEED: f64 = 15.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Yearly,
    Monthly,
    Daily,
    Hourly,
}

impl AnalysisType {
    /// Exact lowercase match; anything else has no axis.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yearly" => Some(AnalysisType::Yearly),
            "monthly" => Some(AnalysisType::Monthly),
            "daily" => Some(AnalysisType::Daily),
            "hourly" => Some(AnalysisType::Hourly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Yearly => "yearly",
            AnalysisType::Monthly => "monthly",
            AnalysisType::Daily => "daily",
            AnalysisType::Hourly => "hourly",
        }
    }

    /// Number of points on this axis.
    pub fn axis_len(&self) -> usize {
        match self {
            AnalysisType::Yearly => YEARS.count(),
            AnalysisType::Monthly => 12,
            AnalysisType::Daily => 30,
            AnalysisType::Hourly => 24,
        }
    }
}

/// Axis position of a prediction point; serializes as `{"year": 2024}` etc.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisValue {
    Year(i32),
    Month(u32),
    Day(u32),
    Hour(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPoint {
    #[serde(flatten)]
    pub axis: AxisValue,
    /// Baseline prediction, rounded to one decimal.
    pub without_sol_gel: f64,
    /// Mitigation scenario, rounded to one decimal.
    pub with_sol_gel: f64,
}

impl PredictionPoint {
    pub fn from_raw(axis: AxisValue, raw: f64) -> Self {
        Self {
            axis,
            without_sol_gel: round1(raw),
            with_sol_gel: round1(raw * MITIGATION_FACTOR),
        }
    }
}

/// A prediction request with every field resolved.
///
/// `city` and `analysis_type` stay raw strings: they are echoed back verbatim.
/// `year`, `month` and `day` are model inputs, so any finite number is taken
/// as-is (no calendar validation).
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionQuery {
    pub city: String,
    pub analysis_type: String,
    pub year: f64,
    pub month: f64,
    pub day: f64,
}

impl Default for PredictionQuery {
    fn default() -> Self {
        Self {
            city: "mumbai".to_string(),
            analysis_type: AnalysisType::Yearly.as_str().to_string(),
            year: 2024.0,
            month: 1.0,
            day: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub predictions: Vec<PredictionPoint>,
    pub current_pollution: f64,
    pub reduced_pollution: f64,
    pub reduction_percent: &'static str,
    pub model_accuracy: String,
    pub city: String,
    pub analysis_type: String,
}

/// Serves prediction series from an immutable model registry.
#[derive(Debug, Clone)]
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
}

impl PredictionService {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Predict the series requested by `query`.
    ///
    /// An unrecognised `analysis_type` yields an empty series, not an error.
    pub fn predict(&self, query: &PredictionQuery) -> Result<PredictionReport, AiError> {
        let model = self
            .registry
            .get(&query.city)
            .ok_or_else(|| AiError::UnknownCity(query.city.clone()))?;

        let rows = AnalysisType::parse(&query.analysis_type)
            .map(|analysis| feature_rows(analysis, query))
            .unwrap_or_default();

        let (axes, features): (Vec<AxisValue>, Vec<FeatureVector>) = rows.into_iter().unzip();
        let raw = if features.is_empty() { Vec::new() } else { model.predict(&features)? };

        let predictions: Vec<PredictionPoint> = axes
            .into_iter()
            .zip(raw)
            .map(|(axis, value)| PredictionPoint::from_raw(axis, value))
            .collect();

        let (current_pollution, reduced_pollution) = predictions
            .last()
            .map(|p| (p.without_sol_gel, p.with_sol_gel))
            .unwrap_or((0.0, 0.0));

        debug!(
            city = %query.city,
            analysis_type = %query.analysis_type,
            points = predictions.len(),
            "prediction series computed"
        );

        Ok(PredictionReport {
            predictions,
            current_pollution,
            reduced_pollution,
            reduction_percent: REDUCTION_LABEL,
            model_accuracy: format!("{:.1}%", model.accuracy() * 100.0),
            city: query.city.clone(),
            analysis_type: query.analysis_type.clone(),
        })
    }
}

/// Feature rows for every point on the requested axis, in axis order.
pub fn feature_rows(analysis: AnalysisType, query: &PredictionQuery) -> Vec<(AxisValue, FeatureVector)> {
    let (year, month, day) = (query.year, query.month, query.day);

    match analysis {
        AnalysisType::Yearly => YEARS
            .map(|y| {
                (
                    AxisValue::Year(y),
                    [f64::from(y), 6.0, 15.0, 12.0, 30.0, 65.0, WIND_SPEED, 1.0, 1.0],
                )
            })
            .collect(),
        AnalysisType::Monthly => (1..=12u32)
            .map(|m| {
                let offset = f64::from(m) - 6.0;
                let temperature = 25.0 + offset * 2.0;
                let humidity = 60.0 + offset * 5.0;
                (
                    AxisValue::Month(m),
                    [year, f64::from(m), 15.0, 12.0, temperature, humidity, WIND_SPEED, 1.0, 1.0],
                )
            })
            .collect(),
        AnalysisType::Daily => (1..=30u32)
            .map(|d| {
                let traffic = 1.0 + f64::from(d % 7) * 0.1;
                (
                    AxisValue::Day(d),
                    [year, month, f64::from(d), 12.0, 28.0, 65.0, WIND_SPEED, 1.0, traffic],
                )
            })
            .collect(),
        AnalysisType::Hourly => (0..24u32)
            .map(|h| {
                let (traffic, industrial) = match HourProfile::of(h) {
                    HourProfile::Rush => (1.5, 1.2),
                    HourProfile::Night => (0.5, 0.8),
                    HourProfile::Regular => (1.0, 1.0),
                };
                let hour = f64::from(h);
                let temperature = if h >= 4 { 20.0 + (hour - 4.0) * 1.5 } else { 20.0 };
                let humidity = if h >= 6 { 70.0 - (hour - 6.0) * 2.0 } else { 70.0 };
                (
                    AxisValue::Hour(h),
                    [year, month, day, hour, temperature, humidity, WIND_SPEED, industrial, traffic],
                )
            })
            .collect(),
    }
}

/// Round to one decimal on the exact binary value (0.35 → 0.3).
fn round1(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SyntheticDataGenerator;
    use crate::regression::Regressor;
    use crate::trainer::{TrainedModel, quick_trainer};
    use ndarray::{Array1, Array2, Axis};
    use proptest::prelude::*;
    use smartair_core::City;

    /// Pollution proportional to the year offset plus the traffic index.
    #[derive(Debug)]
    struct YearTraffic;

    impl Regressor for YearTraffic {
        fn name(&self) -> &'static str {
            "year_traffic"
        }

        fn predict(&self, rows: &Array2<f64>) -> Result<Array1<f64>, AiError> {
            Ok(rows.map_axis(Axis(1), |r| 100.0 + (r[0] - 2021.0) * 10.0 + r[8] * 3.33))
        }
    }

    fn fake_service() -> PredictionService {
        let registry: ModelRegistry = [TrainedModel::new(City::Delhi, Arc::new(YearTraffic), 0.8734)]
            .into_iter()
            .collect();
        PredictionService::new(Arc::new(registry))
    }

    fn query(city: &str, analysis_type: &str) -> PredictionQuery {
        PredictionQuery {
            city: city.to_string(),
            analysis_type: analysis_type.to_string(),
            ..PredictionQuery::default()
        }
    }

    #[test]
    fn series_lengths_match_axis_cardinality() {
        let service = fake_service();
        for (analysis, len) in [("yearly", 8), ("monthly", 12), ("daily", 30), ("hourly", 24)] {
            let report = service.predict(&query("delhi", analysis)).unwrap();
            assert_eq!(report.predictions.len(), len, "{analysis}");
            assert_eq!(AnalysisType::parse(analysis).unwrap().axis_len(), len);
        }
    }

    #[test]
    fn yearly_series_walks_2021_to_2028() {
        let report = fake_service().predict(&query("delhi", "yearly")).unwrap();
        let years: Vec<AxisValue> = report.predictions.iter().map(|p| p.axis).collect();
        assert_eq!(years, (2021..=2028).map(AxisValue::Year).collect::<Vec<_>>());

        // 100 + 7*10 + 3.33
        let last = report.predictions.last().unwrap();
        assert_eq!(last.without_sol_gel, 173.3);
        assert_eq!(last.with_sol_gel, 121.3);
        assert_eq!(report.current_pollution, 173.3);
        assert_eq!(report.reduced_pollution, 121.3);
    }

    #[test]
    fn report_carries_labels_and_echoes_request() {
        let report = fake_service().predict(&query("delhi", "monthly")).unwrap();
        assert_eq!(report.reduction_percent, "30%");
        assert_eq!(report.model_accuracy, "87.3%");
        assert_eq!(report.city, "delhi");
        assert_eq!(report.analysis_type, "monthly");
    }

    #[test]
    fn unknown_city_is_an_error() {
        let err = fake_service().predict(&query("mumbai", "yearly")).unwrap_err();
        assert_eq!(err, AiError::UnknownCity("mumbai".to_string()));
        assert_eq!(err.to_string(), "No model for mumbai");
    }

    #[test]
    fn unknown_analysis_type_yields_empty_series() {
        let report = fake_service().predict(&query("delhi", "weekly")).unwrap();
        assert!(report.predictions.is_empty());
        assert_eq!(report.current_pollution, 0.0);
        assert_eq!(report.reduced_pollution, 0.0);
        assert_eq!(report.analysis_type, "weekly");
    }

    #[test]
    fn monthly_rows_derive_weather_from_june_offset() {
        let rows = feature_rows(AnalysisType::Monthly, &PredictionQuery::default());
        let (axis, jan) = rows[0];
        assert_eq!(axis, AxisValue::Month(1));
        assert_eq!(jan, [2024.0, 1.0, 15.0, 12.0, 15.0, 35.0, 15.0, 1.0, 1.0]);

        let (_, june) = rows[5];
        assert_eq!(june[4], 25.0);
        assert_eq!(june[5], 60.0);
    }

    #[test]
    fn daily_rows_vary_traffic_weekly() {
        let q = PredictionQuery {
            year: 2025.0,
            month: 3.0,
            ..PredictionQuery::default()
        };
        let rows = feature_rows(AnalysisType::Daily, &q);
        assert_eq!(rows[0].1, [2025.0, 3.0, 1.0, 12.0, 28.0, 65.0, 15.0, 1.0, 1.1]);
        assert!((rows[5].1[8] - 1.6).abs() < 1e-9);
        assert_eq!(rows[6].1[8], 1.0);
        assert_eq!(rows[29].0, AxisValue::Day(30));
    }

    #[test]
    fn hourly_rows_follow_rush_and_night_profiles() {
        let q = PredictionQuery {
            year: 2026.0,
            month: 11.0,
            day: 4.0,
            ..PredictionQuery::default()
        };
        let rows = feature_rows(AnalysisType::Hourly, &q);

        assert_eq!(rows[2].1, [2026.0, 11.0, 4.0, 2.0, 20.0, 70.0, 15.0, 0.8, 0.5]);
        assert_eq!(rows[8].1, [2026.0, 11.0, 4.0, 8.0, 26.0, 66.0, 15.0, 1.2, 1.5]);
        assert_eq!(rows[12].1, [2026.0, 11.0, 4.0, 12.0, 32.0, 58.0, 15.0, 1.0, 1.0]);
        assert_eq!(rows[18].1[7..], [1.2, 1.5]);
        assert_eq!(rows[23].0, AxisValue::Hour(23));
    }

    #[test]
    fn points_serialize_with_axis_key() {
        let point = PredictionPoint::from_raw(AxisValue::Year(2024), 120.04);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "year": 2024, "without_sol_gel": 120.0, "with_sol_gel": 84.0 })
        );
    }

    #[test]
    fn rounding_uses_the_exact_binary_value() {
        assert_eq!(round1(0.35), 0.3);
        assert_eq!(round1(120.04), 120.0);
        assert_eq!(round1(-1.26), -1.3);
        assert_eq!(round1(173.33), 173.3);
    }

    #[test]
    fn calendar_fields_are_taken_as_raw_features() {
        let q = PredictionQuery {
            year: 2024.5,
            month: -1.0,
            ..PredictionQuery::default()
        };
        let rows = feature_rows(AnalysisType::Hourly, &q);
        assert_eq!(rows[0].1[..3], [2024.5, -1.0, 1.0]);
    }

    #[test]
    fn trained_series_keep_seasonal_and_rush_hour_shape() {
        let registry = quick_trainer()
            .train_synthetic(&SyntheticDataGenerator::new().with_seed(42))
            .unwrap();
        let service = PredictionService::new(Arc::new(registry));

        for city in City::ALL {
            let monthly = service.predict(&query(city.as_str(), "monthly")).unwrap().predictions;
            let (jan, june, dec) = (
                monthly[0].without_sol_gel,
                monthly[5].without_sol_gel,
                monthly[11].without_sol_gel,
            );
            assert!(jan > june && dec > june, "{city}: jan={jan} june={june} dec={dec}");

            let hourly = service.predict(&query(city.as_str(), "hourly")).unwrap().predictions;
            let (rush, night) = (hourly[8].without_sol_gel, hourly[3].without_sol_gel);
            assert!(rush > night, "{city}: 08h={rush} 03h={night}");
        }
    }

    #[test]
    fn trained_models_serve_every_axis() {
        let registry = quick_trainer()
            .train_synthetic(&SyntheticDataGenerator::new().with_seed(9))
            .unwrap();
        let service = PredictionService::new(Arc::new(registry));

        for city in City::ALL {
            for analysis in [AnalysisType::Yearly, AnalysisType::Monthly, AnalysisType::Daily, AnalysisType::Hourly] {
                let report = service.predict(&query(city.as_str(), analysis.as_str())).unwrap();
                assert_eq!(report.predictions.len(), analysis.axis_len());
                assert!(report.predictions.iter().all(|p| p.without_sol_gel.is_finite()));
                assert!(report.model_accuracy.ends_with('%'));
            }
        }
    }

    proptest! {
        /// The mitigation value is the rounded 70% of the raw prediction.
        #[test]
        fn mitigation_is_seventy_percent(raw in 0.0f64..1000.0) {
            let point = PredictionPoint::from_raw(AxisValue::Hour(0), raw);
            prop_assert_eq!(point.with_sol_gel, round1(raw * 0.7));
            prop_assert_eq!(point.without_sol_gel, round1(raw));
        }
    }
}
