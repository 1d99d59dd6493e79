//! `smartair-ai`
//!
//! **Responsibility:** the pollution "model" subsystem.
//!
//! - `dataset`: synthetic historical samples per city.
//! - `regression`: the regressor seam and a random-forest model (smartcore on ndarray).
//! - `trainer`: fits one model per city and scores it on a held-out split.
//! - `prediction`: builds feature rows per analysis axis and queries a model.
//!
//! Nothing here performs I/O. Models are trained once and then only read.

pub mod dataset;
pub mod prediction;
pub mod regression;
pub mod result;
pub mod trainer;

pub use dataset::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector, HistoricalSample, SyntheticDataGenerator};
pub use prediction::{
    AnalysisType, AxisValue, MITIGATION_FACTOR, PredictionPoint, PredictionQuery, PredictionReport,
    PredictionService,
};
pub use regression::{ForestParams, RandomForest, Regressor, feature_matrix, r2_score};
pub use result::AiError;
pub use trainer::{ModelRegistry, PredictorTrainer, TrainedModel};
