//! BoxConversationStore -- object-safe dynamic dispatch wrapper for ConversationStore.
//!
//! 1. `ConversationStoreDyn` is the object-safe mirror with boxed futures
//! 2. Blanket-impl `ConversationStoreDyn` for all `T: ConversationStore`
//! 3. `BoxConversationStore` wraps `Box<dyn ConversationStoreDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use threadline_types::conversation::Conversation;
use threadline_types::error::StoreError;
use threadline_types::message::Message;

use super::ConversationStore;

/// Object-safe version of [`ConversationStore`] with boxed futures.
pub trait ConversationStoreDyn: Send + Sync {
    fn name(&self) -> &str;

    fn on_message_boxed<'a>(
        &'a self,
        message: &'a Message,
    ) -> Pin<Box<dyn Future<Output = Result<bool, StoreError>> + Send + 'a>>;

    fn get_conversation_boxed<'a>(
        &'a self,
        thread_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Conversation, StoreError>> + Send + 'a>>;
}

impl<T: ConversationStore> ConversationStoreDyn for T {
    fn name(&self) -> &str {
        ConversationStore::name(self)
    }

    fn on_message_boxed<'a>(
        &'a self,
        message: &'a Message,
    ) -> Pin<Box<dyn Future<Output = Result<bool, StoreError>> + Send + 'a>> {
        Box::pin(self.on_message(message))
    }

    fn get_conversation_boxed<'a>(
        &'a self,
        thread_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Conversation, StoreError>> + Send + 'a>> {
        Box::pin(self.get_conversation(thread_id))
    }
}

/// Type-erased conversation store, selected at start-up from configuration.
pub struct BoxConversationStore {
    inner: Box<dyn ConversationStoreDyn + Send + Sync>,
}

impl BoxConversationStore {
    pub fn new<T: ConversationStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn on_message(&self, message: &Message) -> Result<bool, StoreError> {
        self.inner.on_message_boxed(message).await
    }

    pub async fn get_conversation(&self, thread_id: &str) -> Result<Conversation, StoreError> {
        self.inner.get_conversation_boxed(thread_id).await
    }
}

impl ConversationStore for BoxConversationStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn on_message(&self, message: &Message) -> Result<bool, StoreError> {
        self.inner.on_message_boxed(message).await
    }

    async fn get_conversation(&self, thread_id: &str) -> Result<Conversation, StoreError> {
        self.inner.get_conversation_boxed(thread_id).await
    }
}
