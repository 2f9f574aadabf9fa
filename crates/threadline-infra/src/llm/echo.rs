//! EchoClient -- offline [`LlmClient`] that repeats the thread back.

use threadline_core::llm::LlmClient;
use threadline_types::conversation::Conversation;
use threadline_types::error::CompletionError;

const GREETING: &str = "howdy";

/// Replies with the latest message's text, or a greeting for an empty thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoClient;

impl EchoClient {
    pub fn new() -> Self {
        Self
    }
}

impl LlmClient for EchoClient {
    fn name(&self) -> &str {
        "echo"
    }

    async fn completion(
        &self,
        conversation: &Conversation,
        _system_prompt: &str,
    ) -> Result<String, CompletionError> {
        Ok(conversation
            .messages()
            .last()
            .map(|m| m.text())
            .unwrap_or_else(|| GREETING.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadline_types::message::Message;

    #[tokio::test]
    async fn test_echoes_last_message_without_mention() {
        let mut cv = Conversation::new(Message::new("u1", "<@bot> hi", "100.1", "", "c1"));
        cv.append(Message::new("u1", "<@bot> say this", "101.1", "100.1", "c1"));
        let reply = EchoClient::new().completion(&cv, "ignored").await.unwrap();
        assert_eq!(reply, "say this");
    }
}
