//! HTTP route handlers for the Echo relay API.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::conversation::{ChatError, ConversationId, ConversationSummary, Transcript};

use super::error::ApiError;
use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/chat/{chat_id}", get(read_chat).delete(delete_chat))
        .route("/api/chats", get(list_chats))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "echo-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: Option<String>,
    /// Conversation to continue; a new one is started when absent.
    pub chat_id: Option<ConversationId>,
}

/// Chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The model's reply.
    pub ai_response: String,
    /// Conversation the exchange was stored under.
    pub chat_id: ConversationId,
}

/// Delete confirmation.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Confirmation text.
    pub message: &'static str,
}

/// Relay a message, creating or extending a conversation.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ChatError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let reply = state
        .relay
        .relay(request.message.as_deref(), request.chat_id)
        .await?;

    Ok(Json(ChatResponse {
        ai_response: reply.reply,
        chat_id: reply.conversation_id,
    }))
}

/// Return the stored transcript of a conversation.
async fn read_chat(
    State(state): State<Arc<AppState>>,
    chat_id: Result<Path<ConversationId>, PathRejection>,
) -> Result<Json<Transcript>, ApiError> {
    let Ok(Path(chat_id)) = chat_id else {
        return Err(ApiError::chat_not_found());
    };

    let transcript = state.relay.read(chat_id).await?;
    Ok(Json(transcript))
}

/// Delete a conversation; unknown ids succeed.
async fn delete_chat(
    State(state): State<Arc<AppState>>,
    chat_id: Result<Path<ConversationId>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Ok(Path(chat_id)) = chat_id else {
        return Err(ApiError::chat_not_found());
    };

    state.relay.delete(chat_id).await?;
    Ok(Json(DeleteResponse {
        message: "Chat deleted successfully",
    }))
}

/// List stored conversations for the sidebar.
async fn list_chats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let summaries = state.relay.list().await?;
    Ok(Json(summaries))
}
