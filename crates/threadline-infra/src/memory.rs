//! In-process conversation store.
//!
//! Conversations live in a `DashMap` keyed by thread id. The dedup check and
//! the append run under the entry's shard lock, so concurrent deliveries for
//! one thread serialize while other threads proceed. Nothing survives a
//! restart.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use threadline_core::store::{ConversationStore, opens_thread};
use threadline_types::conversation::Conversation;
use threadline_types::error::StoreError;
use threadline_types::message::Message;

pub struct MemoryConversationStore {
    bot_id: String,
    threads: DashMap<String, Conversation>,
}

impl MemoryConversationStore {
    pub fn new(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            threads: DashMap::new(),
        }
    }

    /// Number of tracked threads.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

impl ConversationStore for MemoryConversationStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn on_message(&self, message: &Message) -> Result<bool, StoreError> {
        // The entry guard is dropped before this function returns; it is never
        // held across an await point.
        match self.threads.entry(message.thread_id().to_string()) {
            Entry::Occupied(mut entry) => Ok(entry.get_mut().append(message.clone())),
            Entry::Vacant(entry) => {
                if !opens_thread(message, &self.bot_id) {
                    return Ok(false);
                }
                entry.insert(Conversation::new(message.clone()));
                Ok(true)
            }
        }
    }

    async fn get_conversation(&self, thread_id: &str) -> Result<Conversation, StoreError> {
        // Clone the value out; do not hold the DashMap guard.
        let mut conversation = self
            .threads
            .get(thread_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(thread_id.to_string()))?;
        conversation.sort_chronologically();
        Ok(conversation)
    }
}
