//! Model provider abstraction.
//!
//! The relay only needs one capability from a hosted model: given the prior
//! turns and a new utterance, return the model's next turn.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::conversation::core::transcript::Turn;

/// Boxed future type for provider calls.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors produced by a model provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure talking to the provider.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider did not answer within the configured timeout.
    #[error("provider request timed out")]
    Timeout,
    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },
    /// The prompt was blocked and no candidate was produced.
    #[error("prompt blocked by provider: {0}")]
    Blocked(String),
    /// The reply held no text.
    #[error("provider returned an empty reply")]
    EmptyReply,
}

/// Conversational model capability.
pub trait ModelProvider: Send + Sync {
    /// Produce the model turn answering `message`, given the prior `history`.
    ///
    /// The returned turn always has role [`Role::Model`](crate::conversation::Role::Model).
    ///
    /// # Errors
    /// Returns an error if the provider cannot be reached or returns no usable reply.
    fn generate<'a>(
        &'a self,
        history: &'a [Turn],
        message: &'a str,
    ) -> ProviderFuture<'a, Result<Turn, ProviderError>>;
}
