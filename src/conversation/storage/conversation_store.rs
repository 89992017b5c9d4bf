//! Conversation store: one row per conversation, transcript kept as a JSON blob.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::OptionalExtension;
use serde::Serialize;
use tokio_rusqlite::Connection;

use crate::conversation::core::config::StorageConfig;
use crate::conversation::core::errors::{ChatError, ChatResult};
use crate::conversation::core::ids::ConversationId;
use crate::conversation::core::transcript::Transcript;

/// Boxed future type for conversation store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Listing entry for a stored conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    /// Conversation id.
    pub id: ConversationId,
    /// Display title.
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last transcript update.
    pub updated_at: DateTime<Utc>,
}

/// Conversation store trait.
pub trait ConversationStore: Send + Sync {
    /// Insert a new conversation and return its id.
    ///
    /// # Errors
    /// Returns an error if the transcript is empty or storage access fails.
    fn create(&self, title: String, transcript: Transcript)
    -> StoreFuture<'_, ChatResult<ConversationId>>;

    /// Load the transcript of a conversation.
    ///
    /// # Errors
    /// Returns [`ChatError::NotFound`] for an unknown id, or an error if storage access fails.
    fn get(&self, id: ConversationId) -> StoreFuture<'_, ChatResult<Transcript>>;

    /// Overwrite the transcript of an existing conversation.
    ///
    /// # Errors
    /// Returns [`ChatError::NotFound`] for an unknown id, or an error if storage access fails.
    fn replace(&self, id: ConversationId, transcript: Transcript)
    -> StoreFuture<'_, ChatResult<()>>;

    /// Delete a conversation. Deleting an unknown id succeeds.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn delete(&self, id: ConversationId) -> StoreFuture<'_, ChatResult<()>>;

    /// List all conversations, most recently updated first.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn list(&self) -> StoreFuture<'_, ChatResult<Vec<ConversationSummary>>>;
}

/// `SQLite` implementation of the conversation store.
pub struct SqliteConversationStore {
    conn: Connection,
}

impl SqliteConversationStore {
    /// Open (or create) the database and initialize the schema.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> ChatResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        let store = Self::init(conn).await?;
        tracing::info!(
            path = %config.sqlite_path.display(),
            "Database initialized"
        );
        Ok(store)
    }

    /// Open a database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> ChatResult<Self> {
        let config = StorageConfig {
            sqlite_path: path.as_ref().to_path_buf(),
        };
        Self::new(&config).await
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn open_in_memory() -> ChatResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> ChatResult<Self> {
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS conversations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    messages TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_conversations_updated
                    ON conversations (updated_at);",
            )?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }
}

impl ConversationStore for SqliteConversationStore {
    fn create(
        &self,
        title: String,
        transcript: Transcript,
    ) -> StoreFuture<'_, ChatResult<ConversationId>> {
        Box::pin(async move {
            if transcript.is_empty() {
                return Err(ChatError::InvalidRequest(
                    "a conversation needs at least one exchange".to_string(),
                ));
            }

            let messages = serde_json::to_string(&transcript)?;
            let now = Utc::now().timestamp_millis();

            let id = self
                .conn
                .call(move |conn| {
                    conn.execute(
                        "INSERT INTO conversations (title, messages, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?3)",
                        rusqlite::params![title, messages, now],
                    )?;
                    Ok(conn.last_insert_rowid())
                })
                .await?;

            Ok(ConversationId::new(id))
        })
    }

    fn get(&self, id: ConversationId) -> StoreFuture<'_, ChatResult<Transcript>> {
        Box::pin(async move {
            let messages: Option<String> = self
                .conn
                .call(move |conn| {
                    let messages = conn
                        .query_row(
                            "SELECT messages FROM conversations WHERE id = ?1",
                            rusqlite::params![id.get()],
                            |row| row.get(0),
                        )
                        .optional()?;
                    Ok(messages)
                })
                .await?;

            let messages = messages.ok_or(ChatError::NotFound(id))?;
            serde_json::from_str(&messages).map_err(|err| {
                ChatError::CorruptTranscript(format!("conversation {id}: {err}"))
            })
        })
    }

    fn replace(&self, id: ConversationId, transcript: Transcript) -> StoreFuture<'_, ChatResult<()>> {
        Box::pin(async move {
            let messages = serde_json::to_string(&transcript)?;
            let now = Utc::now().timestamp_millis();

            let updated = self
                .conn
                .call(move |conn| {
                    let updated = conn.execute(
                        "UPDATE conversations SET messages = ?1, updated_at = ?2 WHERE id = ?3",
                        rusqlite::params![messages, now, id.get()],
                    )?;
                    Ok(updated)
                })
                .await?;

            if updated == 0 {
                return Err(ChatError::NotFound(id));
            }
            Ok(())
        })
    }

    fn delete(&self, id: ConversationId) -> StoreFuture<'_, ChatResult<()>> {
        Box::pin(async move {
            let deleted = self
                .conn
                .call(move |conn| {
                    let deleted = conn.execute(
                        "DELETE FROM conversations WHERE id = ?1",
                        rusqlite::params![id.get()],
                    )?;
                    Ok(deleted)
                })
                .await?;

            if deleted == 0 {
                tracing::debug!(%id, "Delete of unknown conversation ignored");
            }
            Ok(())
        })
    }

    fn list(&self) -> StoreFuture<'_, ChatResult<Vec<ConversationSummary>>> {
        Box::pin(async move {
            let rows = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(
                        "SELECT id, title, created_at, updated_at
                         FROM conversations
                         ORDER BY updated_at DESC, id DESC",
                    )?;
                    let rows = stmt
                        .query_map([], |row| {
                            let id: i64 = row.get(0)?;
                            let title: String = row.get(1)?;
                            let created_at: i64 = row.get(2)?;
                            let updated_at: i64 = row.get(3)?;
                            Ok((id, title, created_at, updated_at))
                        })?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await?;

            let mut summaries = Vec::with_capacity(rows.len());
            for (id, title, created_at, updated_at) in rows {
                summaries.push(ConversationSummary {
                    id: ConversationId::new(id),
                    title,
                    created_at: timestamp_from_millis(created_at)?,
                    updated_at: timestamp_from_millis(updated_at)?,
                });
            }

            Ok(summaries)
        })
    }
}

fn timestamp_from_millis(millis: i64) -> ChatResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ChatError::CorruptTranscript(format!("invalid timestamp: {millis}")))
}
