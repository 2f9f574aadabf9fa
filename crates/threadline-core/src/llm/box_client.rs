//! BoxLlmClient -- object-safe dynamic dispatch wrapper for LlmClient.

use std::future::Future;
use std::pin::Pin;

use threadline_types::conversation::Conversation;
use threadline_types::error::CompletionError;

use super::client::LlmClient;

/// Object-safe version of [`LlmClient`] with boxed futures.
pub trait LlmClientDyn: Send + Sync {
    fn name(&self) -> &str;

    fn completion_boxed<'a>(
        &'a self,
        conversation: &'a Conversation,
        system_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>>;
}

impl<T: LlmClient> LlmClientDyn for T {
    fn name(&self) -> &str {
        LlmClient::name(self)
    }

    fn completion_boxed<'a>(
        &'a self,
        conversation: &'a Conversation,
        system_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
        Box::pin(self.completion(conversation, system_prompt))
    }
}

/// Type-erased LLM client.
///
/// `LlmClient` uses RPITIT and cannot be a trait object directly;
/// `BoxLlmClient` delegates to the inner `LlmClientDyn`.
pub struct BoxLlmClient {
    inner: Box<dyn LlmClientDyn + Send + Sync>,
}

impl BoxLlmClient {
    pub fn new<T: LlmClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn completion(
        &self,
        conversation: &Conversation,
        system_prompt: &str,
    ) -> Result<String, CompletionError> {
        self.inner.completion_boxed(conversation, system_prompt).await
    }
}
