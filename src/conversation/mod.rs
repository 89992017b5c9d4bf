//! Conversation subsystem for the Echo relay.
//!
//! - `core`: configuration, errors, ids and the transcript model
//! - `storage`: the `SQLite`-backed conversation store
//! - `relay`: the relay service tying the store to the model provider

pub mod core;
pub mod relay;
pub mod storage;

pub use self::core::{
    ChatError, ChatResult, ConversationId, EchoConfig, ProviderConfig, Role, ServerConfig,
    StorageConfig, Transcript, Turn, derive_title,
};
pub use relay::{RelayReply, RelayService};
pub use storage::{ConversationStore, ConversationSummary, SqliteConversationStore};
