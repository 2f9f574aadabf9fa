//! LlmClient trait definition.

use threadline_types::conversation::Conversation;
use threadline_types::error::CompletionError;

/// A backend that turns a conversation into the bot's next reply.
///
/// Implementations live in threadline-infra (`EchoClient`, `OpenAiClient`).
pub trait LlmClient: Send + Sync {
    /// Human-readable backend name (e.g. "echo", "openai").
    fn name(&self) -> &str;

    /// Produce reply text for `conversation` under `system_prompt`.
    fn completion(
        &self,
        conversation: &Conversation,
        system_prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, CompletionError>> + Send;
}
