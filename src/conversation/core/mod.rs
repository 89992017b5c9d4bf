//! Core conversation types, configuration and errors.

pub mod config;
pub mod errors;
pub mod ids;
pub mod transcript;

pub use config::{EchoConfig, ProviderConfig, ServerConfig, StorageConfig};
pub use errors::{ChatError, ChatResult};
pub use ids::ConversationId;
pub use transcript::{Role, Transcript, Turn, derive_title};
