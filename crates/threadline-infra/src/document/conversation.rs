//! Document-backed conversation store.
//!
//! One document per thread: `{thread_id, channel, initiator, messages: [...]}`.
//! Messages are appended with an array-union merge, so a redelivered message
//! is a no-op. The union compares whole messages; a redelivery whose text was
//! edited is caught by the timestamp check made under the same document lock.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use threadline_core::store::{ConversationStore, opens_thread};
use threadline_types::conversation::Conversation;
use threadline_types::error::StoreError;
use threadline_types::message::Message;

use super::{Document, DocumentCollection, DocumentError, FieldUpdate};

pub struct DocumentConversationStore {
    collection: DocumentCollection,
    bot_id: String,
}

#[derive(Deserialize)]
struct StoredConversation {
    thread_id: String,
    #[serde(default)]
    channel: String,
    #[serde(default)]
    initiator: String,
    #[serde(default)]
    messages: Vec<Message>,
}

impl DocumentConversationStore {
    pub async fn open(dir: impl Into<PathBuf>, bot_id: impl Into<String>) -> Result<Self, StoreError> {
        let collection = DocumentCollection::open(dir).await.map_err(storage)?;
        Ok(Self {
            collection,
            bot_id: bot_id.into(),
        })
    }
}

fn storage(e: DocumentError) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn has_timestamp(doc: &Document, ts: &str) -> bool {
    doc.get("messages")
        .and_then(Value::as_array)
        .is_some_and(|items| {
            items
                .iter()
                .any(|m| m.get("timestamp").and_then(Value::as_str) == Some(ts))
        })
}

impl ConversationStore for DocumentConversationStore {
    fn name(&self) -> &str {
        "document"
    }

    async fn on_message(&self, message: &Message) -> Result<bool, StoreError> {
        let thread_id = message.thread_id();
        let opens = opens_thread(message, &self.bot_id);
        let entry = serde_json::to_value(message)
            .map_err(|e| StoreError::Storage(format!("serialize message: {e}")))?;

        let outcome = self
            .collection
            .merge_if(thread_id, |doc| {
                match doc {
                    None if !opens => return None,
                    Some(doc) if has_timestamp(doc, message.timestamp()) => return None,
                    _ => {}
                }
                Some(vec![
                    FieldUpdate::Set("thread_id".into(), Value::from(thread_id)),
                    FieldUpdate::Set("channel".into(), Value::from(message.channel())),
                    FieldUpdate::SetIfAbsent("initiator".into(), Value::from(message.from())),
                    FieldUpdate::ArrayUnion("messages".into(), vec![entry]),
                ])
            })
            .await
            .map_err(storage)?;

        Ok(outcome.is_some_and(|o| o.appended > 0))
    }

    async fn get_conversation(&self, thread_id: &str) -> Result<Conversation, StoreError> {
        let doc = self
            .collection
            .get(thread_id)
            .await
            .map_err(storage)?
            .ok_or_else(|| StoreError::NotFound(thread_id.to_string()))?;

        let stored: StoredConversation = serde_json::from_value(Value::Object(doc))
            .map_err(|e| StoreError::Storage(format!("decode conversation {thread_id}: {e}")))?;

        Conversation::from_parts(
            stored.thread_id,
            stored.channel,
            stored.initiator,
            stored.messages,
        )
        .ok_or_else(|| StoreError::NotFound(thread_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentConversationStore::open(dir.path(), "bot").await.unwrap();
        store
            .on_message(&Message::new("u1", "<@bot> hi", "100.1", "", "c1"))
            .await
            .unwrap();
        store
            .on_message(&Message::new("u2", "hey", "110.1", "100.1", "c1"))
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(dir.path().join("100.1.json")).await.unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["thread_id"], "100.1");
        assert_eq!(doc["channel"], "c1");
        assert_eq!(doc["initiator"], "u1");
        assert_eq!(doc["messages"].as_array().unwrap().len(), 2);
        assert_eq!(doc["messages"][1]["raw_text"], "hey");
    }

    #[tokio::test]
    async fn test_edited_redelivery_is_already_present() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentConversationStore::open(dir.path(), "bot").await.unwrap();
        assert!(store
            .on_message(&Message::new("u1", "<@bot> hi", "100.1", "", "c1"))
            .await
            .unwrap());
        assert!(!store
            .on_message(&Message::new("u1", "<@bot> hi (edited)", "100.1", "", "c1"))
            .await
            .unwrap());
        let cv = store.get_conversation("100.1").await.unwrap();
        assert_eq!(cv.len(), 1);
        assert_eq!(cv.messages()[0].raw_text(), "<@bot> hi");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentConversationStore::open(dir.path(), "bot").await.unwrap();
        tokio::fs::write(dir.path().join("100.1.json"), b"not json").await.unwrap();
        assert!(matches!(
            store.get_conversation("100.1").await,
            Err(StoreError::Storage(_))
        ));
    }
}
