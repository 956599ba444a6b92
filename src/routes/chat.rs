//! Chat REST routes. Websocket clients use `chat:send` instead.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::services::chatbot::{self, ChatError, ChatReply, GREETING, QUICK_PROMPTS};
use crate::state::AppState;

pub(crate) fn chat_error_to_status(err: &ChatError) -> StatusCode {
    match err {
        ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
        ChatError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatIntro {
    pub greeting: &'static str,
    pub quick_prompts: [&'static str; 4],
}

/// `GET /api/chat`: opening message and suggested prompts.
pub async fn intro() -> Json<ChatIntro> {
    Json(ChatIntro { greeting: GREETING, quick_prompts: QUICK_PROMPTS })
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
    /// Omit to start a new session; reuse the returned id to continue it.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// `POST /api/chat`
pub async fn send_chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Result<Json<ChatReply>, StatusCode> {
    let session_id = body.session_id.unwrap_or_else(Uuid::new_v4);
    chatbot::send(&state, session_id, &body.message).await.map(Json).map_err(|e| {
        warn!(%session_id, error = %e, "chat: rejected message");
        chat_error_to_status(&e)
    })
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
