use thiserror::Error;

/// Failures of the model subsystem.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AiError {
    /// Prediction was requested for a city without a trained model.
    #[error("No model for {0}")]
    UnknownCity(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("training failed: {0}")]
    TrainingFailed(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),
}
