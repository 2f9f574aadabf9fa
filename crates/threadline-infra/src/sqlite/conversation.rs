//! SQLite conversation store.
//!
//! Implements `ConversationStore` from `threadline-core` on a single
//! append-only `conversations` table. Each message is one row with a UUIDv7
//! row id; `UNIQUE(thread_id, message_ts)` is the dedup key, and a violation
//! of it means "already present".

use chrono::SecondsFormat;
use sqlx::Row;
use uuid::Uuid;

use threadline_core::store::{ConversationStore, opens_thread};
use threadline_types::conversation::Conversation;
use threadline_types::error::StoreError;
use threadline_types::message::Message;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationStore`.
pub struct SqliteConversationStore {
    pool: DatabasePool,
    bot_id: String,
}

impl SqliteConversationStore {
    pub fn new(pool: DatabasePool, bot_id: impl Into<String>) -> Self {
        Self {
            pool,
            bot_id: bot_id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct ConversationRow {
    conversation_id: String,
    parent_user_id: String,
    text: String,
    message_ts: String,
    thread_ts: String,
    channel: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            conversation_id: row.try_get("conversation_id")?,
            parent_user_id: row.try_get("parent_user_id")?,
            text: row.try_get("text")?,
            message_ts: row.try_get("message_ts")?,
            thread_ts: row.try_get("thread_ts")?,
            channel: row.try_get("channel")?,
        })
    }

    fn into_message(self) -> Message {
        Message::new(
            self.parent_user_id,
            self.text,
            self.message_ts,
            self.thread_ts,
            self.channel,
        )
    }
}

fn storage(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

// ---------------------------------------------------------------------------
// ConversationStore impl
// ---------------------------------------------------------------------------

impl ConversationStore for SqliteConversationStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn on_message(&self, message: &Message) -> Result<bool, StoreError> {
        let thread_id = message.thread_id();

        // The writer pool has one connection, so the existence check and the
        // insert cannot interleave with another write.
        let mut tx = self.pool.writer.begin().await.map_err(storage)?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM conversations WHERE thread_id = ? LIMIT 1")
                .bind(thread_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage)?;

        if exists.is_none() && !opens_thread(message, &self.bot_id) {
            return Ok(false);
        }

        let created_at = message
            .created_at()
            .to_rfc3339_opts(SecondsFormat::Nanos, true);

        let result = sqlx::query(
            r#"INSERT INTO conversations
               (conversation_id, parent_user_id, text, message_ts, thread_ts,
                thread_id, channel, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(message.from())
        .bind(message.raw_text())
        .bind(message.timestamp())
        .bind(message.thread_timestamp())
        .bind(thread_id)
        .bind(message.channel())
        .bind(&created_at)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {
                tx.commit().await.map_err(storage)?;
                Ok(true)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                tracing::debug!(thread_id, ts = message.timestamp(), "message already stored");
                Ok(false)
            }
            Err(e) => Err(storage(e)),
        }
    }

    async fn get_conversation(&self, thread_id: &str) -> Result<Conversation, StoreError> {
        let rows = sqlx::query(
            r#"SELECT conversation_id, parent_user_id, text, message_ts, thread_ts, channel
               FROM conversations
               WHERE thread_id = ?
               ORDER BY created_at ASC, conversation_id ASC"#,
        )
        .bind(thread_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(storage)?;

        let rows = rows
            .iter()
            .map(ConversationRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;

        // UUIDv7 ids sort by insertion; the lowest one opened the thread.
        let Some(opener) = rows.iter().min_by(|a, b| a.conversation_id.cmp(&b.conversation_id))
        else {
            return Err(StoreError::NotFound(thread_id.to_string()));
        };
        let initiator = opener.parent_user_id.clone();
        let channel = opener.channel.clone();

        let messages = rows.into_iter().map(ConversationRow::into_message).collect();

        Conversation::from_parts(thread_id, channel, initiator, messages)
            .ok_or_else(|| StoreError::NotFound(thread_id.to_string()))
    }
}
