//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: model training and alert pipeline wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and their mapping to domain queries
//! - `errors.rs`: consistent `{error}` responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .route("/api/predict", post(routes::predict::predict))
        .route("/api/chatbot", post(routes::chatbot::chatbot))
        .route("/api/alerts/trigger", post(routes::alerts::trigger))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(Extension(services)),
        )
}
