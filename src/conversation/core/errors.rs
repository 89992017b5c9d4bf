//! Error types for the conversation subsystem.

use thiserror::Error;

use crate::conversation::core::ids::ConversationId;
use crate::llm::provider::ProviderError;

/// Conversation subsystem error type.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or malformed caller input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// No conversation is stored under this id.
    #[error("conversation {0} not found")]
    NotFound(ConversationId),
    /// The model provider failed to produce a reply.
    #[error("model provider error: {0}")]
    Upstream(#[from] ProviderError),
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// Transcript encoding error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A stored row could not be decoded.
    #[error("corrupt transcript: {0}")]
    CorruptTranscript(String),
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A required credential is absent from the environment.
    #[error("{0} is not set; add it to the environment or a .env file")]
    MissingCredential(&'static str),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// Whether the error originates from the persistence layer.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(_) | Self::TokioSqlite(_) | Self::Serialization(_) | Self::CorruptTranscript(_)
        )
    }
}

/// Convenience result alias for conversation operations.
pub type ChatResult<T> = Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        assert!(ChatError::CorruptTranscript("bad".to_string()).is_storage());
        assert!(ChatError::Sqlite(rusqlite::Error::QueryReturnedNoRows).is_storage());
        assert!(!ChatError::Upstream(ProviderError::EmptyReply).is_storage());
        assert!(!ChatError::NotFound(ConversationId::new(1)).is_storage());
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = ChatError::MissingCredential("GEMINI_API_KEY");
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
