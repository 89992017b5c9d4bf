//! Model provider components: the provider trait, the Gemini client and the persona.

pub mod gemini;
pub mod persona;
pub mod provider;

pub use gemini::GeminiProvider;
pub use persona::DEFAULT_SYSTEM_PROMPT;
pub use provider::{ModelProvider, ProviderError, ProviderFuture};
