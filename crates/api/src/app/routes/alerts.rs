use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::{error, info};

use crate::app::errors;
use crate::app::services::AppServices;

/// Run one alert dispatch to completion before answering.
pub async fn trigger(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    info!("alert trigger received");

    let dispatcher = services.dispatcher.clone();
    match tokio::spawn(async move { dispatcher.dispatch().await }).await {
        Ok(summary) => {
            info!(run_id = %summary.run_id, sent = summary.sent, "triggered alert run finished");
            Json(json!({
                "status": "success",
                "message": "Pollution alerts sent to all subscribed users!",
            }))
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "alert dispatch task failed");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
