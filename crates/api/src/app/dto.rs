use serde::{Deserialize, Deserializer};

use smartair_ai::PredictionQuery;

// -------------------------
// Request DTOs
// -------------------------

/// `POST /api/predict` body; every field is optional.
///
/// Calendar fields are plain JSON numbers and go to the model unvalidated.
/// An explicit `null` city or analysis type is kept as the text `null`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PredictRequest {
    #[serde(deserialize_with = "text_or_null")]
    pub city: String,
    #[serde(deserialize_with = "text_or_null")]
    pub analysis_type: String,
    pub year: f64,
    pub month: f64,
    pub day: f64,
}

fn text_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(|| "null".to_string()))
}

impl Default for PredictRequest {
    fn default() -> Self {
        let q = PredictionQuery::default();
        Self {
            city: q.city,
            analysis_type: q.analysis_type,
            year: q.year,
            month: q.month,
            day: q.day,
        }
    }
}

impl From<PredictRequest> for PredictionQuery {
    fn from(req: PredictRequest) -> Self {
        Self {
            city: req.city,
            analysis_type: req.analysis_type,
            year: req.year,
            month: req.month,
            day: req.day,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatbotRequest {
    #[serde(default)]
    pub message: String,
}
