use std::sync::Arc;

use axum::{Json, extract::Extension, extract::rejection::JsonRejection, response::IntoResponse};

use smartair_ai::PredictionQuery;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn predict(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::PredictRequest>, JsonRejection>,
) -> axum::response::Response {
    let query = match body {
        Ok(Json(req)) => PredictionQuery::from(req),
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match services.predictions.predict(&query) {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::ai_error_to_response(e),
    }
}
