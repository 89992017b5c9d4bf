//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::conversation::{
    ChatResult, ConversationStore, EchoConfig, RelayService, SqliteConversationStore,
};
use crate::llm::{GeminiProvider, ModelProvider};

/// Shared application state.
pub struct AppState {
    /// Relay over the conversation store and the model provider.
    pub relay: RelayService,
}

impl AppState {
    /// Open the store and build the Gemini provider from configuration.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or the HTTP client cannot be built.
    pub async fn new(config: &EchoConfig) -> ChatResult<Arc<Self>> {
        let store = SqliteConversationStore::new(&config.storage).await?;
        let provider = GeminiProvider::new(&config.provider)?;
        tracing::info!(model = %config.provider.model, "Gemini provider ready");

        Ok(Self::from_parts(Arc::new(store), Arc::new(provider)))
    }

    /// Build state from an already constructed store and provider.
    #[must_use]
    pub fn from_parts(
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn ModelProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            relay: RelayService::new(store, provider),
        })
    }
}
