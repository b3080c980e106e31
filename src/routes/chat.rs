//! Chat routes: send a message to the diagram assistant, read or clear the
//! transcript.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::Owner;
use crate::error::ApiError;
use crate::services::assistant::{self, ChatOutcome};
use crate::services::diagram as diagram_service;
use crate::services::transcript::ChatMessage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

/// `POST /api/diagrams/{id}/chat`
pub async fn send(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatOutcome>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }
    Ok(Json(assistant::handle_chat(&state, &owner, id, message).await?))
}

/// `GET /api/diagrams/{id}/messages`
pub async fn list_messages(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    diagram_service::get_diagram(&state, &owner, id).await?;
    Ok(Json(state.transcripts.list(&owner, id).await))
}

/// `DELETE /api/diagrams/{id}/messages`
pub async fn clear_messages(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    diagram_service::get_diagram(&state, &owner, id).await?;
    let cleared = state.transcripts.clear(&owner, id).await;
    tracing::info!(%owner, diagram_id = %id, cleared, "chat: transcript cleared");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
