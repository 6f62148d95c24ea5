//! `POST /api/chat`: one stateless turn; the history travels with the request

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Utc;
use confidant_core::conversation::{ConversationSession, Transcript, Turn};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message_history: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub message_history: Vec<Turn>,
    pub timestamp: String,
}

/// Present and not blank; the value is returned as sent
fn required(field: Option<String>, name: &str) -> Result<String, ApiError> {
    field
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} is required")))
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;

    let message = required(request.message, "message")?;
    let user_id = required(request.user_id, "userId")?.trim().to_string();

    let session = if request.message_history.is_empty() {
        ConversationSession::start(
            user_id.as_str(),
            &state.persona,
            state.provider.clone(),
            state.memory.clone(),
        )
        .await
    } else {
        let transcript = Transcript::from_turns(request.message_history)?;
        ConversationSession::resume(
            user_id.as_str(),
            transcript,
            state.provider.clone(),
            state.memory.clone(),
        )
    };
    let mut session = session.with_settings(state.settings);

    let reply = session.respond(&message).await?;
    tracing::info!(
        owner_id = %user_id,
        turns = session.transcript().len(),
        fallback = reply.fallback,
        "Chat turn completed"
    );

    // The save keeps running after the response is sent.
    drop(reply.persisted);

    Ok(Json(ChatResponse {
        success: true,
        response: reply.response,
        message_history: session.into_transcript().into_turns(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}
