// File: src/conversation/core/ids.rs

//! Identifier types for stored conversations.
//!
//! Conversation ids are assigned by `SQLite` (`INTEGER PRIMARY KEY AUTOINCREMENT`),
//! so the newtype wraps the row id rather than generating values itself.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a stored conversation.
///
/// Assigned once by the store on creation and never reused, even after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ConversationId(i64);

impl ConversationId {
    /// Wrap a raw row id.
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Extract the raw row id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConversationId {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ConversationId> for i64 {
    #[inline]
    fn from(value: ConversationId) -> Self {
        value.0
    }
}

impl FromStr for ConversationId {
    type Err = core::num::ParseIntError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}
