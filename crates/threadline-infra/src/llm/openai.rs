//! OpenAiClient -- [`LlmClient`] for any OpenAI-compatible chat completions API.
//!
//! The conversation is flattened with [`conversation_to_turns`]: initiator
//! messages become `user` turns, everything else `assistant` turns, with the
//! system prompt first.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::{ExposeSecret, SecretString};

use threadline_core::llm::LlmClient;
use threadline_core::llm::prompt::conversation_to_turns;
use threadline_types::config::OpenAiSettings;
use threadline_types::conversation::Conversation;
use threadline_types::error::CompletionError;
use threadline_types::llm::{MessageRole, Turn};

/// Chat-completions client.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(api_key: &SecretString, settings: &OpenAiSettings) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(&settings.base_url);

        Self {
            client: Client::with_config(config),
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, turns: &[Turn]) -> CreateChatCompletionRequest {
        let messages = turns.iter().map(to_request_message).collect();
        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(self.temperature),
            ..Default::default()
        }
    }
}

fn to_request_message(turn: &Turn) -> ChatCompletionRequestMessage {
    match turn.role {
        MessageRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(turn.content.clone()),
                name: None,
            })
        }
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(turn.content.clone()),
            name: None,
        }),
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    turn.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn completion(
        &self,
        conversation: &Conversation,
        system_prompt: &str,
    ) -> Result<String, CompletionError> {
        let turns = conversation_to_turns(conversation, system_prompt);
        let request = self.build_request(&turns);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

fn map_openai_error(err: async_openai::error::OpenAIError) -> CompletionError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                CompletionError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                CompletionError::RateLimited
            } else if code == "context_length_exceeded"
                || api_err.message.contains("maximum context length")
            {
                CompletionError::ContextLengthExceeded
            } else {
                CompletionError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => CompletionError::AuthenticationFailed,
            Some(429) => CompletionError::RateLimited,
            _ => CompletionError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            CompletionError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => CompletionError::InvalidRequest(msg.clone()),
        _ => CompletionError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadline_types::message::Message;

    fn client() -> OpenAiClient {
        OpenAiClient::new(
            &SecretString::from("sk-test".to_string()),
            &OpenAiSettings::default(),
        )
    }

    #[test]
    fn test_defaults() {
        let c = client();
        assert_eq!(c.name(), "openai");
        assert_eq!(c.model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_build_request_roles() {
        let mut cv = Conversation::new(Message::new("u1", "<@bot> hi", "100.1", "", "c1"));
        cv.append(Message::new("bot", "hello", "101.1", "100.1", "c1"));
        cv.append(Message::new("u1", "thanks", "102.1", "100.1", "c1"));

        let c = client();
        let req = c.build_request(&conversation_to_turns(&cv, "Be helpful"));
        assert_eq!(req.model, "gpt-3.5-turbo");
        assert_eq!(req.temperature, Some(0.0));
        assert_eq!(req.messages.len(), 4);
        assert!(matches!(req.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(req.messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(req.messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(req.messages[3], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_map_invalid_argument() {
        let err = async_openai::error::OpenAIError::InvalidArgument("bad".into());
        assert_eq!(map_openai_error(err), CompletionError::InvalidRequest("bad".into()));
    }
}
