use std::sync::Arc;

use axum::{Json, extract::Extension, extract::rejection::JsonRejection};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::app::dto;
use crate::app::services::AppServices;

const CHAT_PROMPT: &str = "You can chat with our AI assistant using the Chatbase interface below.";
const CHAT_UNAVAILABLE: &str = "I'm having trouble connecting to the chatbot. Please try again.";

/// Points the client at the hosted chat widget. Always answers 200.
pub async fn chatbot(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ChatbotRequest>, JsonRejection>,
) -> Json<Value> {
    match body {
        Ok(Json(req)) => {
            debug!(message_len = req.message.len(), "chatbot request");
            Json(json!({
                "response": CHAT_PROMPT,
                "chatbase_url": services.chatbase_url,
                "type": "external_chatbot",
            }))
        }
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "malformed chatbot request");
            Json(json!({
                "response": CHAT_UNAVAILABLE,
                "type": "error",
            }))
        }
    }
}
