//! The chat endpoint.
//!
//! `POST /chat` takes `{"message": "...", "user_id": "..."}` and answers
//! with `{"response": "...", "type": "<category>"}`. A missing or empty
//! message is a 400; handler failures surface as 500 with the error text.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::router::ChatRouter;

#[derive(Clone)]
pub struct ChatState {
    router: Arc<ChatRouter>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct ChatError {
    pub error: String,
}

pub fn router(chat_router: Arc<ChatRouter>) -> Router {
    Router::new().route("/chat", post(chat)).with_state(ChatState { router: chat_router })
}

pub async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatError>)> {
    if request.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ChatError { error: "메시지가 필요합니다.".to_string() }),
        ));
    }

    let correlation_id = Uuid::new_v4().to_string();
    tracing::info!(
        event_name = "chat.turn.start",
        correlation_id = %correlation_id,
        user_id = %request.user_id,
        "handling chat turn"
    );

    match state.router.handle_turn(&request.user_id, &request.message).await {
        Ok(reply) => {
            tracing::info!(
                event_name = "chat.turn.completed",
                correlation_id = %correlation_id,
                user_id = %request.user_id,
                category = %reply.kind,
                "chat turn answered"
            );
            Ok(Json(ChatResponse { response: reply.response, kind: reply.kind.to_string() }))
        }
        Err(error) => {
            tracing::error!(
                event_name = "chat.turn.failed",
                correlation_id = %correlation_id,
                user_id = %request.user_id,
                error = %error,
                "chat turn failed"
            );
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ChatError { error: error.to_string() })))
        }
    }
}
