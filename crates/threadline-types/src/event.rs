//! Inbound chat-platform event payloads.
//!
//! These mirror the subset of the Slack Events API and interactivity payloads
//! the bot consumes. Unknown event kinds deserialize to an `Other` variant so
//! new platform events never fail a request.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Outer Events API envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Endpoint ownership check; the challenge must be echoed back.
    UrlVerification { challenge: String },

    /// A subscribed event.
    EventCallback {
        event: InnerEvent,
        #[serde(default)]
        event_id: Option<String>,
        #[serde(default)]
        team_id: Option<String>,
    },

    #[serde(other)]
    Other,
}

/// Inner event of an `event_callback` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InnerEvent {
    Message(MessageEvent),

    /// Mentions also arrive as `message` events; this variant is accepted and
    /// ignored so the same message is not processed twice.
    AppMention(MessageEvent),

    #[serde(other)]
    Other,
}

/// A channel message event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub event_ts: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl MessageEvent {
    /// Normalize into a [`Message`].
    pub fn to_message(&self) -> Message {
        Message::new(
            self.user.clone(),
            self.text.clone(),
            self.ts.clone(),
            self.thread_ts.clone().unwrap_or_default(),
            self.channel.clone(),
        )
    }
}

/// Interactivity callback posted when a user presses a message button.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionCallback {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub channel: Option<IdRef>,
    #[serde(default)]
    pub message: Option<InteractionMessage>,
    #[serde(default)]
    pub actions: Vec<BlockAction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}

/// The message that carried the pressed button.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionMessage {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockAction {
    #[serde(default)]
    pub action_id: String,
    #[serde(default)]
    pub value: String,
}

impl InteractionCallback {
    pub fn channel_id(&self) -> &str {
        self.channel.as_ref().map(|c| c.id.as_str()).unwrap_or("")
    }

    /// Thread the button's message lives in.
    pub fn thread_id(&self) -> &str {
        match &self.message {
            Some(m) => m.thread_ts.as_deref().unwrap_or(&m.ts),
            None => "",
        }
    }
}
