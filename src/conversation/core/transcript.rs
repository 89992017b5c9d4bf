//! Transcript model for stored conversations.
//!
//! The serialized shape is a JSON array of `{"role": "user" | "model", "parts": [..]}`
//! objects; it is returned verbatim by the read endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 30;

/// Marker appended to titles that were cut short.
pub const TITLE_TRUNCATION_MARKER: &str = "...";

/// Author of a transcript turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// User input.
    User,
    /// Model reply.
    Model,
}

impl Role {
    /// Stable string form for storage and the provider wire format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "model" => Ok(Self::Model),
            _ => Err(value.to_string()),
        }
    }
}

/// A single turn of a conversation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced the turn.
    pub role: Role,
    /// Ordered text segments.
    pub parts: Vec<String>,
}

impl Turn {
    /// Build a user turn holding one text segment.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![text.into()],
        }
    }

    /// Build a model turn from its text segments.
    #[must_use]
    pub const fn model(parts: Vec<String>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    /// Full text of the turn (segments concatenated in order).
    #[must_use]
    pub fn text(&self) -> String {
        self.parts.concat()
    }
}

/// Ordered, chronological sequence of turns.
pub type Transcript = Vec<Turn>;

/// Derive a conversation title from the first user message.
///
/// Messages of at most [`TITLE_MAX_CHARS`] characters are kept verbatim; longer
/// ones keep their first [`TITLE_MAX_CHARS`] characters followed by
/// [`TITLE_TRUNCATION_MARKER`]. Counting is per `char`, so a code point is never split.
#[must_use]
pub fn derive_title(message: &str) -> String {
    match message.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{TITLE_TRUNCATION_MARKER}", &message[..cut]),
        None => message.to_string(),
    }
}
