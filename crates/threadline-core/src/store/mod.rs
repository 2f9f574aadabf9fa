//! Conversation store port.
//!
//! Implementations live in threadline-infra (memory, sqlite, document). Every
//! implementation must satisfy the same contract; the shared behaviour tests
//! in `threadline_infra::contract` run against all of them.

pub mod box_store;

use threadline_types::conversation::Conversation;
use threadline_types::error::StoreError;
use threadline_types::message::Message;

pub use box_store::BoxConversationStore;

/// Keyed collection of conversations, one per thread id.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ConversationStore: Send + Sync {
    /// Backend name, e.g. "memory".
    fn name(&self) -> &str;

    /// Record an inbound message.
    ///
    /// Returns `Ok(true)` when the message was newly stored and `Ok(false)`
    /// when it was dropped: either it would open a new thread without
    /// mentioning the bot, or a message with the same timestamp is already in
    /// the thread. Duplicate-key conflicts are never errors.
    fn on_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Fetch the conversation for `thread_id`, oldest message first.
    ///
    /// Fails with [`StoreError::NotFound`] when the thread is unknown.
    fn get_conversation(
        &self,
        thread_id: &str,
    ) -> impl std::future::Future<Output = Result<Conversation, StoreError>> + Send;
}

/// Whether a message may open a new tracked thread.
///
/// Only a directed mention of the bot starts a conversation.
pub fn opens_thread(message: &Message, bot_id: &str) -> bool {
    message.is_mention_of(bot_id)
}
