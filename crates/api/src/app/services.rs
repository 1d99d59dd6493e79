use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use smartair_ai::{AiError, PredictionService, PredictorTrainer, SyntheticDataGenerator};
use smartair_infra::{AlertDispatcher, MailError};

use crate::config::ApiConfig;

/// Shared, read-only state behind every handler.
pub struct AppServices {
    pub predictions: PredictionService,
    pub dispatcher: Arc<AlertDispatcher>,
    pub chatbase_url: String,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("model training failed: {0}")]
    Training(#[from] AiError),

    #[error("mail relay setup failed: {0}")]
    Mail(#[from] MailError),
}

impl AppServices {
    pub fn new(predictions: PredictionService, dispatcher: Arc<AlertDispatcher>, chatbase_url: impl Into<String>) -> Self {
        Self {
            predictions,
            dispatcher,
            chatbase_url: chatbase_url.into(),
        }
    }
}

/// Train one model per city and wire the alert pipeline.
pub fn build_services(config: &ApiConfig) -> Result<AppServices, StartupError> {
    let generator = match config.seed {
        Some(seed) => SyntheticDataGenerator::new().with_seed(seed),
        None => SyntheticDataGenerator::new(),
    };

    let registry = PredictorTrainer::new().train_synthetic(&generator)?;
    info!(models = registry.len(), seed = ?config.seed, "models trained and ready");

    let dispatcher = AlertDispatcher::from_config(&config.alerts)?;

    Ok(AppServices::new(
        PredictionService::new(Arc::new(registry)),
        Arc::new(dispatcher),
        config.chatbase_url.clone(),
    ))
}
