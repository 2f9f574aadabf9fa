//! SlackPoster -- [`ChatPoster`] over the Slack Web API.
//!
//! Replies go to `chat.postMessage` with the bot token as a bearer token.
//! When an incoming-webhook URL is configured, plain posts use it instead
//! (actionable posts always need the Web API for blocks).
//!
//! Slack answers HTTP 200 with `{"ok": false, "error": "..."}` on failure,
//! so the body is checked as well as the status.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use threadline_core::chat::ChatPoster;
use threadline_types::error::PostError;
use threadline_types::message::Message;

use super::blocks::build_blocks;

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    thread_ts: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

// Does NOT derive Debug: holds the bot token.
pub struct SlackPoster {
    client: reqwest::Client,
    token: SecretString,
    api_base_url: String,
    webhook_url: Option<String>,
}

impl SlackPoster {
    pub fn new(token: SecretString, api_base_url: impl Into<String>) -> Result<Self, PostError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PostError::Http(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            token,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            webhook_url: None,
        })
    }

    /// Send plain replies through an incoming webhook.
    pub fn with_webhook_url(mut self, url: Option<String>) -> Self {
        self.webhook_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    fn validate(reply: &Message) -> Result<(), PostError> {
        if reply.channel().is_empty() {
            return Err(PostError::InvalidReply("reply has no channel".into()));
        }
        if reply.raw_text().trim().is_empty() {
            return Err(PostError::InvalidReply("reply text is empty".into()));
        }
        Ok(())
    }

    async fn post_web_api(&self, body: &PostMessageRequest<'_>) -> Result<(), PostError> {
        let url = format!("{}/chat.postMessage", self.api_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| PostError::Http(format!("chat.postMessage failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PostError::Http(format!("HTTP {status}: {text}")));
        }

        let parsed: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| PostError::Http(format!("unreadable chat.postMessage response: {e}")))?;
        if !parsed.ok {
            return Err(PostError::Api(
                parsed.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        Ok(())
    }

    async fn post_webhook(&self, url: &str, body: &PostMessageRequest<'_>) -> Result<(), PostError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| PostError::Http(format!("webhook post failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PostError::Api(format!("webhook HTTP {status}: {text}")));
        }
        Ok(())
    }
}

impl ChatPoster for SlackPoster {
    fn name(&self) -> &str {
        "slack.webhook"
    }

    async fn post_message(&self, reply: &Message) -> Result<(), PostError> {
        Self::validate(reply)?;
        let body = PostMessageRequest {
            channel: reply.channel(),
            thread_ts: reply.thread_id(),
            text: reply.raw_text(),
            blocks: None,
        };
        tracing::debug!(channel = reply.channel(), thread_id = reply.thread_id(), "posting reply");
        match &self.webhook_url {
            Some(url) => self.post_webhook(url, &body).await,
            None => self.post_web_api(&body).await,
        }
    }

    async fn post_actionable_message(&self, reply: &Message) -> Result<(), PostError> {
        Self::validate(reply)?;
        let blocks = build_blocks(reply.message_id(), reply.raw_text());
        let body = PostMessageRequest {
            channel: reply.channel(),
            thread_ts: reply.thread_id(),
            text: reply.raw_text(),
            blocks: (!blocks.is_empty()).then_some(blocks),
        };
        tracing::debug!(
            channel = reply.channel(),
            thread_id = reply.thread_id(),
            "posting actionable reply"
        );
        self.post_web_api(&body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_empty_thread_and_blocks() {
        let body = PostMessageRequest {
            channel: "C1",
            thread_ts: "",
            text: "hi",
            blocks: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v, serde_json::json!({"channel": "C1", "text": "hi"}));
    }

    #[test]
    fn test_validate_rejects_empty_reply() {
        assert!(matches!(
            SlackPoster::validate(&Message::reply("C1", "100.1", "  ")),
            Err(PostError::InvalidReply(_))
        ));
        assert!(matches!(
            SlackPoster::validate(&Message::reply("", "100.1", "hi")),
            Err(PostError::InvalidReply(_))
        ));
        assert!(SlackPoster::validate(&Message::reply("C1", "100.1", "hi")).is_ok());
    }

    #[test]
    fn test_blank_webhook_url_is_ignored() {
        let poster = SlackPoster::new(SecretString::from("xoxb-test".to_string()), "https://slack.com/api/")
            .unwrap()
            .with_webhook_url(Some("  ".into()));
        assert!(poster.webhook_url.is_none());
        assert_eq!(poster.api_base_url, "https://slack.com/api");
    }

    #[test]
    fn test_error_response_parses() {
        let r: PostMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error":"channel_not_found"}"#).unwrap();
        assert!(!r.ok);
        assert_eq!(r.error.as_deref(), Some("channel_not_found"));
    }
}
