use ndarray::{Array1, Array2};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};

use crate::dataset::{FEATURE_COUNT, FeatureVector};
use crate::result::AiError;

/// A fitted model mapping feature rows to pollution levels.
///
/// Implementations must be pure: predicting never mutates the model.
pub trait Regressor: Send + Sync + core::fmt::Debug + 'static {
    /// Short model name for logs.
    fn name(&self) -> &'static str;

    /// One prediction per row of `rows` (`n × FEATURE_COUNT`).
    fn predict(&self, rows: &Array2<f64>) -> Result<Array1<f64>, AiError>;
}

/// Stack feature vectors into an `n × FEATURE_COUNT` matrix.
pub fn feature_matrix(rows: &[FeatureVector]) -> Array2<f64> {
    Array2::from(rows.to_vec())
}

/// Tree-ensemble hyperparameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ForestParams {
    pub n_trees: u16,
    pub max_depth: u16,
    pub min_samples_leaf: u16,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 40,
            max_depth: 12,
            min_samples_leaf: 10,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn with_n_trees(mut self, n_trees: u16) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: u16) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn to_smartcore(self) -> RandomForestRegressorParameters {
        // Every split considers all features.
        RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees.into())
            .with_max_depth(self.max_depth.into())
            .with_min_samples_leaf(self.min_samples_leaf.into())
            .with_m(FEATURE_COUNT)
            .with_seed(self.seed)
    }
}

type Forest = RandomForestRegressor<f64, f64, Array2<f64>, Array1<f64>>;

/// Bagged regression trees (smartcore) over the raw feature rows.
pub struct RandomForest {
    forest: Forest,
    params: ForestParams,
}

impl core::fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RandomForest").field("params", &self.params).finish_non_exhaustive()
    }
}

impl RandomForest {
    /// Fit the ensemble to `x` (`n × FEATURE_COUNT`) and targets `y`.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, params: ForestParams) -> Result<Self, AiError> {
        if x.ncols() != FEATURE_COUNT {
            return Err(AiError::InvalidDataset(format!(
                "expected {FEATURE_COUNT} feature columns, got {}",
                x.ncols()
            )));
        }
        if x.nrows() != y.len() {
            return Err(AiError::InvalidDataset(format!(
                "feature rows ({}) and targets ({}) differ in length",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() < 2 * usize::from(params.min_samples_leaf.max(1)) {
            return Err(AiError::InvalidDataset(format!(
                "{} rows are too few for leaves of {}",
                x.nrows(),
                params.min_samples_leaf
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(AiError::InvalidDataset("non-finite value in training data".to_string()));
        }
        if params.n_trees == 0 {
            return Err(AiError::TrainingFailed("forest needs at least one tree".to_string()));
        }

        let forest = Forest::fit(x, y, params.to_smartcore())
            .map_err(|e| AiError::TrainingFailed(e.to_string()))?;

        Ok(Self { forest, params })
    }

    pub fn params(&self) -> ForestParams {
        self.params
    }
}

impl Regressor for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn predict(&self, rows: &Array2<f64>) -> Result<Array1<f64>, AiError> {
        if rows.ncols() != FEATURE_COUNT {
            return Err(AiError::InferenceFailed(format!(
                "expected {FEATURE_COUNT} feature columns, got {}",
                rows.ncols()
            )));
        }
        if rows.nrows() == 0 {
            return Ok(Array1::zeros(0));
        }
        self.forest
            .predict(rows)
            .map_err(|e| AiError::InferenceFailed(e.to_string()))
    }
}

/// Coefficient of determination of `predicted` against `actual`.
///
/// Undefined (an error) for fewer than two samples or constant targets.
pub fn r2_score(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<f64, AiError> {
    if actual.len() != predicted.len() {
        return Err(AiError::InvalidDataset("r2: length mismatch".to_string()));
    }
    if actual.len() < 2 {
        return Err(AiError::InvalidDataset("r2: need at least two samples".to_string()));
    }

    let score = smartcore::metrics::r2(actual, predicted);
    if !score.is_finite() {
        return Err(AiError::InvalidDataset("r2: targets are constant".to_string()));
    }
    Ok(score)
}
