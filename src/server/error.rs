//! JSON error responses for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::conversation::ChatError;

/// Body text returned for unknown conversations.
pub const CHAT_NOT_FOUND: &str = "Chat not found";

/// An error rendered as `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// 404 for a conversation that does not exist (or an id that cannot be one).
    #[must_use]
    pub fn chat_not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: CHAT_NOT_FOUND.to_string(),
        }
    }

    /// Status code of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::InvalidRequest(message) => {
                tracing::debug!("Rejected request: {message}");
                Self {
                    status: StatusCode::BAD_REQUEST,
                    message,
                }
            }
            ChatError::NotFound(id) => {
                tracing::debug!(%id, "Conversation not found");
                Self::chat_not_found()
            }
            ChatError::Upstream(ref source) => {
                tracing::error!("Model provider failure: {source}");
                Self::internal(&err)
            }
            ref other if other.is_storage() => {
                tracing::error!("Storage failure: {other}");
                Self::internal(&err)
            }
            other => {
                tracing::error!("Unexpected failure: {other}");
                Self::internal(&other)
            }
        }
    }
}

impl ApiError {
    fn internal(err: &ChatError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
