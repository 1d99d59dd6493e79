use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

use smartair_core::City;

use ndarray::{Array1, Array2};

use crate::dataset::{FEATURE_NAMES, FeatureVector, HistoricalSample, SyntheticDataGenerator};
use crate::regression::{ForestParams, RandomForest, Regressor, feature_matrix, r2_score};
use crate::result::AiError;

/// A city's fitted model plus its held-out accuracy.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    city: City,
    model: Arc<dyn Regressor>,
    accuracy: f64,
}

impl TrainedModel {
    pub fn new(city: City, model: Arc<dyn Regressor>, accuracy: f64) -> Self {
        Self { city, model, accuracy }
    }

    pub fn city(&self) -> City {
        self.city
    }

    /// R² on the held-out split.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn features(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Predict one value per feature row, in row order.
    pub fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, AiError> {
        let values = self.model.predict(&feature_matrix(rows))?;
        if values.len() != rows.len() {
            return Err(AiError::InferenceFailed(format!(
                "{} returned {} predictions for {} rows",
                self.model.name(),
                values.len(),
                rows.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AiError::InferenceFailed(format!(
                "{} produced a non-finite prediction for {}",
                self.model.name(),
                self.city
            )));
        }
        Ok(values.to_vec())
    }
}

/// Immutable set of trained models, at most one per city.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<City, TrainedModel>,
}

impl ModelRegistry {
    /// Look up a model by raw city key (`"mumbai"`, `"delhi"`).
    pub fn get(&self, city: &str) -> Option<&TrainedModel> {
        let city: City = city.parse().ok()?;
        self.models.get(&city)
    }

    pub fn cities(&self) -> impl Iterator<Item = City> + '_ {
        self.models.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Later models replace earlier ones for the same city.
impl FromIterator<TrainedModel> for ModelRegistry {
    fn from_iter<I: IntoIterator<Item = TrainedModel>>(iter: I) -> Self {
        Self {
            models: iter.into_iter().map(|m| (m.city, m)).collect(),
        }
    }
}

/// Fits one random forest per city on an 80/20 train/test split.
///
/// The training side of the split is capped at `max_train_rows` (taken from
/// the shuffled order) to bound start-up time; R² uses the whole test side.
#[derive(Debug, Clone)]
pub struct PredictorTrainer {
    test_fraction: f64,
    split_seed: u64,
    max_train_rows: usize,
    forest: ForestParams,
}

impl Default for PredictorTrainer {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            split_seed: 42,
            max_train_rows: 6_000,
            forest: ForestParams::default(),
        }
    }
}

impl PredictorTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    pub fn with_split_seed(mut self, split_seed: u64) -> Self {
        self.split_seed = split_seed;
        self
    }

    pub fn with_max_train_rows(mut self, max_train_rows: usize) -> Self {
        self.max_train_rows = max_train_rows;
        self
    }

    pub fn with_forest(mut self, forest: ForestParams) -> Self {
        self.forest = forest;
        self
    }

    /// Generate a dataset and train every city on it.
    pub fn train_synthetic(&self, generator: &SyntheticDataGenerator) -> Result<ModelRegistry, AiError> {
        info!(seed = ?generator.seed(), "training pollution models on synthetic data");
        let samples = generator.generate();
        self.train(&samples)
    }

    pub fn train(&self, samples: &[HistoricalSample]) -> Result<ModelRegistry, AiError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AiError::InvalidDataset(
                "test_fraction must be within (0, 1)".to_string(),
            ));
        }

        City::ALL
            .into_iter()
            .map(|city| {
                let rows: Vec<&HistoricalSample> = samples.iter().filter(|s| s.city == city).collect();
                self.train_city(city, &rows)
            })
            .collect()
    }

    fn train_city(&self, city: City, rows: &[&HistoricalSample]) -> Result<TrainedModel, AiError> {
        if rows.is_empty() {
            return Err(AiError::InvalidDataset(format!("no samples for {city}")));
        }

        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(self.split_seed));

        let test_len = ((rows.len() as f64) * self.test_fraction).ceil() as usize;
        let (test_idx, train_idx) = order.split_at(test_len.min(rows.len()));
        let train_idx = &train_idx[..train_idx.len().min(self.max_train_rows)];

        let (train_x, train_y) = columns(rows, train_idx);
        let (test_x, test_y) = columns(rows, test_idx);

        let model = RandomForest::fit(&train_x, &train_y, self.forest)?;
        let accuracy = r2_score(&test_y, &model.predict(&test_x)?)?;
        let r2 = format!("{accuracy:.4}");

        info!(
            city = %city,
            model = model.name(),
            train_rows = train_idx.len(),
            test_rows = test_idx.len(),
            r2 = %r2,
            "model trained"
        );

        Ok(TrainedModel::new(city, Arc::new(model), accuracy))
    }
}

fn columns(rows: &[&HistoricalSample], idx: &[usize]) -> (Array2<f64>, Array1<f64>) {
    let (x, y): (Vec<FeatureVector>, Vec<f64>) =
        idx.iter().map(|&i| (rows[i].features(), rows[i].pollution)).unzip();
    (feature_matrix(&x), Array1::from(y))
}

/// Small forest on a capped sample, for tests that need a real model.
#[cfg(test)]
pub(crate) fn quick_trainer() -> PredictorTrainer {
    PredictorTrainer::new().with_max_train_rows(3_000).with_forest(
        ForestParams::default()
            .with_n_trees(12)
            .with_max_depth(10)
            .with_min_samples_leaf(5),
    )
}
