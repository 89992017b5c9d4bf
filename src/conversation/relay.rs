//! Relay service: validates an utterance, rebuilds the prior transcript, asks the
//! model provider for a reply and persists the extended transcript.
//!
//! Persistence happens only after the provider reply is fully received, so a
//! provider failure never leaves a partial transcript behind.

use std::sync::Arc;

use serde::Serialize;

use crate::conversation::core::errors::{ChatError, ChatResult};
use crate::conversation::core::ids::ConversationId;
use crate::conversation::core::transcript::{Transcript, Turn, derive_title};
use crate::conversation::storage::conversation_store::{ConversationStore, ConversationSummary};
use crate::llm::provider::ModelProvider;

/// Outcome of one relayed utterance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelayReply {
    /// Model reply text.
    pub reply: String,
    /// Conversation the exchange was stored under.
    pub conversation_id: ConversationId,
}

/// Relay between callers, the conversation store and the model provider.
#[derive(Clone)]
pub struct RelayService {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn ModelProvider>,
}

impl RelayService {
    /// Create a relay over an injected store and provider.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>, provider: Arc<dyn ModelProvider>) -> Self {
        Self { store, provider }
    }

    /// Relay a user utterance, starting a new conversation when `conversation_id` is `None`.
    ///
    /// # Errors
    /// - [`ChatError::InvalidRequest`] if `message` is absent or empty; nothing is touched.
    /// - [`ChatError::NotFound`] if `conversation_id` does not resolve.
    /// - [`ChatError::Upstream`] if the provider fails; nothing is persisted.
    /// - A storage error if reading or writing the transcript fails.
    pub async fn relay(
        &self,
        message: Option<&str>,
        conversation_id: Option<ConversationId>,
    ) -> ChatResult<RelayReply> {
        let message = match message {
            Some(message) if !message.is_empty() => message,
            _ => return Err(ChatError::InvalidRequest("Message is required".to_string())),
        };

        let history: Transcript = match conversation_id {
            Some(id) => self.store.get(id).await?,
            None => Vec::new(),
        };
        let prior_turns = history.len();

        let reply_turn = self.provider.generate(&history, message).await?;
        let reply = reply_turn.text();

        let mut transcript = history;
        transcript.push(Turn::user(message));
        transcript.push(reply_turn);

        let conversation_id = match conversation_id {
            Some(id) => {
                self.store.replace(id, transcript).await?;
                id
            }
            None => {
                self.store
                    .create(derive_title(message), transcript)
                    .await?
            }
        };

        tracing::info!(
            %conversation_id,
            prior_turns,
            reply_chars = reply.chars().count(),
            "Relayed message"
        );

        Ok(RelayReply {
            reply,
            conversation_id,
        })
    }

    /// Load the full transcript of a conversation.
    ///
    /// # Errors
    /// Returns [`ChatError::NotFound`] for an unknown id, or a storage error.
    pub async fn read(&self, id: ConversationId) -> ChatResult<Transcript> {
        self.store.get(id).await
    }

    /// Delete a conversation; unknown ids are accepted.
    ///
    /// # Errors
    /// Returns a storage error if the delete fails.
    pub async fn delete(&self, id: ConversationId) -> ChatResult<()> {
        self.store.delete(id).await?;
        tracing::info!(%id, "Deleted conversation");
        Ok(())
    }

    /// List stored conversations, most recently updated first.
    ///
    /// # Errors
    /// Returns a storage error if the listing fails.
    pub async fn list(&self) -> ChatResult<Vec<ConversationSummary>> {
        self.store.list().await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingStore, STORE_FAILURE, ScriptedProvider};
    use super::*;
    use crate::conversation::core::transcript::Role;
    use crate::conversation::storage::conversation_store::SqliteConversationStore;
    use crate::llm::provider::ProviderError;

    async fn relay_with_store() -> (RelayService, Arc<SqliteConversationStore>, Arc<ScriptedProvider>) {
        let store = Arc::new(SqliteConversationStore::open_in_memory().await.unwrap());
        let provider = Arc::new(ScriptedProvider::default());
        let relay = RelayService::new(store.clone(), provider.clone());
        (relay, store, provider)
    }

    #[tokio::test]
    async fn test_new_conversation_stores_one_exchange() {
        let (relay, _store, provider) = relay_with_store().await;

        let reply = relay.relay(Some("hello"), None).await.unwrap();
        assert_eq!(reply.reply, "echo: hello");

        let transcript = relay.read(reply.conversation_id).await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], Turn::user("hello"));
        assert_eq!(transcript[1].role, Role::Model);
        assert_eq!(transcript[1].text(), "echo: hello");

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.is_empty());
    }

    #[tokio::test]
    async fn test_new_conversations_get_fresh_ids() {
        let (relay, _store, _provider) = relay_with_store().await;

        let first = relay.relay(Some("one"), None).await.unwrap();
        let second = relay.relay(Some("two"), None).await.unwrap();
        assert_ne!(first.conversation_id, second.conversation_id);
    }

    #[tokio::test]
    async fn test_follow_up_appends_in_order() {
        let (relay, _store, provider) = relay_with_store().await;

        let first = relay.relay(Some("first"), None).await.unwrap();
        let before = relay.read(first.conversation_id).await.unwrap();

        let second = relay
            .relay(Some("second"), Some(first.conversation_id))
            .await
            .unwrap();
        assert_eq!(second.conversation_id, first.conversation_id);

        let after = relay.read(first.conversation_id).await.unwrap();
        assert_eq!(after.len(), before.len() + 2);
        assert_eq!(&after[..before.len()], before.as_slice());
        assert_eq!(after[2], Turn::user("second"));
        assert_eq!(after[3].text(), "echo: second");

        let calls = provider.calls();
        assert_eq!(calls[1].0, before);
        assert_eq!(calls[1].1, "second");
    }

    #[tokio::test]
    async fn test_title_comes_from_first_message() {
        let (relay, store, _provider) = relay_with_store().await;
        let long = "This week has been really overwhelming for me";

        let reply = relay.relay(Some(long), None).await.unwrap();
        relay
            .relay(Some("and another thing"), Some(reply.conversation_id))
            .await
            .unwrap();

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, derive_title(long));
    }

    #[tokio::test]
    async fn test_missing_or_empty_message_touches_nothing() {
        let (relay, store, provider) = relay_with_store().await;

        for message in [None, Some("")] {
            let err = relay.relay(message, None).await.unwrap_err();
            assert!(matches!(err, ChatError::InvalidRequest(_)));
        }
        let err = relay
            .relay(Some(""), Some(ConversationId::new(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidRequest(_)));

        assert!(provider.calls().is_empty());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_conversation_is_not_found() {
        let (relay, store, provider) = relay_with_store().await;

        let err = relay
            .relay(Some("hello"), Some(ConversationId::new(42)))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotFound(_)));
        assert!(provider.calls().is_empty());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_persists_nothing() {
        let (relay, store, provider) = relay_with_store().await;

        provider.fail_next(ProviderError::Timeout);
        let err = relay.relay(Some("hello"), None).await.unwrap_err();
        assert!(matches!(err, ChatError::Upstream(ProviderError::Timeout)));
        assert!(store.list().await.unwrap().is_empty());

        let first = relay.relay(Some("hello"), None).await.unwrap();
        let before = relay.read(first.conversation_id).await.unwrap();

        provider.fail_next(ProviderError::EmptyReply);
        let err = relay
            .relay(Some("again"), Some(first.conversation_id))
            .await
            .unwrap_err();
        assert!(!err.is_storage());
        assert_eq!(relay.read(first.conversation_id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_store_write_failure_after_reply_is_storage_error() {
        let provider = Arc::new(ScriptedProvider::default());
        let relay = RelayService::new(Arc::new(FailingStore), provider.clone());

        let err = relay.relay(Some("hello"), None).await.unwrap_err();
        assert!(err.is_storage());
        assert!(matches!(err, ChatError::CorruptTranscript(ref detail) if detail == STORE_FAILURE));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_store_read_failure_skips_provider() {
        let provider = Arc::new(ScriptedProvider::default());
        let relay = RelayService::new(Arc::new(FailingStore), provider.clone());

        let err = relay
            .relay(Some("hello"), Some(ConversationId::new(3)))
            .await
            .unwrap_err();
        assert!(err.is_storage());
        assert!(provider.calls().is_empty());

        let err = relay.read(ConversationId::new(3)).await.unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_delete_then_read_is_not_found() {
        let (relay, _store, _provider) = relay_with_store().await;

        let reply = relay.relay(Some("bye"), None).await.unwrap();
        relay.delete(reply.conversation_id).await.unwrap();
        relay.delete(reply.conversation_id).await.unwrap();

        let err = relay.read(reply.conversation_id).await.unwrap_err();
        assert!(matches!(err, ChatError::NotFound(_)));
    }
}
