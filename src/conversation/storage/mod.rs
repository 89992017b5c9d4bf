//! Persistent storage for conversations.

pub mod conversation_store;

pub use conversation_store::{
    ConversationStore, ConversationSummary, SqliteConversationStore, StoreFuture,
};
