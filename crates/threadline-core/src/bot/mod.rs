//! Bot orchestrator: ingest, decide, respond.
//!
//! [`ChatBot`] composes the conversation store, the engagement policy and the
//! collaborators. Persistence and the engagement decision happen on the
//! caller's task; the LLM call and reply post run detached on the
//! [`ResponsePool`] so the inbound event can be acknowledged immediately.

pub mod pool;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use threadline_types::conversation::Conversation;
use threadline_types::error::BotError;
use threadline_types::event::{InteractionCallback, MessageEvent};
use threadline_types::message::Message;

use crate::chat::BoxChatPoster;
use crate::engagement::should_respond;
use crate::llm::BoxLlmClient;
use crate::responder::BoxCommandResponder;
use crate::store::BoxConversationStore;

pub use pool::ResponsePool;

const DEBUG_PREFIX: &str = "^DEBUG\n";

/// Message subtypes that carry a real user message. Everything else
/// (edits, deletions, joins) is platform bookkeeping.
const ACCEPTED_SUBTYPES: &[&str] = &["thread_broadcast", "file_share"];

/// Static settings for a [`ChatBot`].
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub bot_id: String,
    pub system_prompt: String,
    pub response_timeout: Duration,
    pub responder_timeout: Duration,
    /// Channels to listen in. Empty means all.
    pub allowed_channels: Vec<String>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            bot_id: String::new(),
            system_prompt: String::new(),
            response_timeout: Duration::from_secs(60),
            responder_timeout: Duration::from_secs(60),
            allowed_channels: Vec::new(),
        }
    }
}

/// What happened to an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Dropped before storage (own echo, filtered channel, bookkeeping event).
    Ignored,
    /// The store did not add it: unrelated chatter or a redelivery.
    NotAdded,
    /// Stored, but not directed at the bot.
    NotEngaged,
    /// Stored and a reply is being generated.
    Responding,
}

pub struct ChatBot {
    store: BoxConversationStore,
    llm: Arc<BoxLlmClient>,
    chat: Arc<BoxChatPoster>,
    responder: Arc<BoxCommandResponder>,
    settings: BotSettings,
    system_prompt: Arc<str>,
    verbose: AtomicBool,
    pool: ResponsePool,
}

impl ChatBot {
    pub fn new(
        store: BoxConversationStore,
        llm: BoxLlmClient,
        chat: BoxChatPoster,
        responder: BoxCommandResponder,
        settings: BotSettings,
        pool: ResponsePool,
    ) -> Self {
        let system_prompt = Arc::from(settings.system_prompt.as_str());
        Self {
            store,
            llm: Arc::new(llm),
            chat: Arc::new(chat),
            responder: Arc::new(responder),
            settings,
            system_prompt,
            verbose: AtomicBool::new(false),
            pool,
        }
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn store(&self) -> &BoxConversationStore {
        &self.store
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Handle one inbound message event.
    ///
    /// Returns once the message is persisted and the engagement decision is
    /// made; reply generation continues on the response pool.
    #[tracing::instrument(
        skip_all,
        fields(channel = %event.channel, ts = %event.ts)
    )]
    pub async fn on_message(&self, event: &MessageEvent) -> Result<Disposition, BotError> {
        if let Some(subtype) = event.subtype.as_deref() {
            if !ACCEPTED_SUBTYPES.contains(&subtype) {
                tracing::trace!(subtype, "ignoring message subtype");
                return Ok(Disposition::Ignored);
            }
        }

        let message = event.to_message();

        if !self.is_channel_allowed(message.channel()) {
            tracing::trace!("channel not in allowlist");
            return Ok(Disposition::Ignored);
        }

        if let Err(e) = self.process_debug_message(&message).await {
            tracing::warn!(error = %e, "debug command failed");
        }

        if !self.settings.bot_id.is_empty() && message.from() == self.settings.bot_id {
            return Ok(Disposition::Ignored);
        }

        if !self.store.on_message(&message).await? {
            return Ok(Disposition::NotAdded);
        }

        let thread_id = message.thread_id();
        let conversation = self.store.get_conversation(thread_id).await?;

        if !should_respond(&conversation, &message, &self.settings.bot_id) {
            tracing::debug!(thread_id, "message stored, not engaged");
            return Ok(Disposition::NotEngaged);
        }

        tracing::info!(thread_id, messages = conversation.len(), "engaging");
        self.spawn_response(conversation, &message)?;
        Ok(Disposition::Responding)
    }

    /// Handle a button press: run the action's script and post its output
    /// back into the thread.
    #[tracing::instrument(skip_all, fields(channel = %callback.channel_id()))]
    pub async fn on_interaction(&self, callback: &InteractionCallback) -> Result<(), BotError> {
        let Some(action) = callback.actions.first() else {
            return Ok(());
        };

        let script = action.value.clone();
        let channel = callback.channel_id().to_string();
        let thread_id = callback.thread_id().to_string();
        let responder = Arc::clone(&self.responder);
        let chat = Arc::clone(&self.chat);

        self.pool.submit("interaction", self.settings.responder_timeout, async move {
            let output = responder.handle(&script).await?;
            let exit_status = match output.exit_status() {
                s if s.is_empty() => s,
                s => format!("{s}\n"),
            };
            let text = format!("```{script}```\n{exit_status}```{}```", output.output);
            chat.post_message(&Message::reply(channel, thread_id, text)).await?;
            Ok::<(), BotError>(())
        })?;
        Ok(())
    }

    /// Fetch a stored conversation.
    pub async fn get_conversation(&self, thread_id: &str) -> Result<Conversation, BotError> {
        Ok(self.store.get_conversation(thread_id).await?)
    }

    /// Stop taking new responses and drain the pool.
    pub async fn shutdown(&self, grace: Duration) {
        self.pool.shutdown(grace).await;
    }

    fn is_channel_allowed(&self, channel: &str) -> bool {
        self.settings.allowed_channels.is_empty()
            || self.settings.allowed_channels.iter().any(|c| c == channel)
    }

    fn spawn_response(&self, conversation: Conversation, message: &Message) -> Result<(), BotError> {
        let llm = Arc::clone(&self.llm);
        let chat = Arc::clone(&self.chat);
        let prompt = Arc::clone(&self.system_prompt);
        let channel = message.channel().to_string();
        let thread_id = message.thread_id().to_string();

        self.pool.submit("response", self.settings.response_timeout, async move {
            let text = llm.completion(&conversation, &prompt).await?;
            let reply = Message::reply(channel, thread_id, text);
            chat.post_actionable_message(&reply).await?;
            tracing::debug!(thread_id = reply.thread_id(), "reply posted");
            Ok::<(), BotError>(())
        })?;
        Ok(())
    }

    async fn process_debug_message(&self, message: &Message) -> Result<(), BotError> {
        let text = message.text();
        if !text.starts_with("debug ") {
            return Ok(());
        }

        match text.as_str() {
            "debug vars" => {
                let vars = [
                    format!("mode: {}", self.chat.name()),
                    format!("messagestorage: {}", self.store.name()),
                    format!("llm: {}", self.llm.name()),
                    format!("botID: {}", self.settings.bot_id),
                ];
                return self.post_debug(message, &vars.join("\n")).await;
            }
            "debug off" => {
                self.verbose.store(false, Ordering::Relaxed);
                return Ok(());
            }
            "debug on" => self.verbose.store(true, Ordering::Relaxed),
            _ => {}
        }

        if self.is_verbose() {
            let conversation = self.store.get_conversation(message.thread_id()).await?;
            self.post_debug(message, &conversation.to_string()).await?;
        }
        Ok(())
    }

    async fn post_debug(&self, message: &Message, body: &str) -> Result<(), BotError> {
        let reply = Message::reply(
            message.channel(),
            message.thread_id(),
            format!("{DEBUG_PREFIX}{body}"),
        );
        self.chat.post_actionable_message(&reply).await?;
        Ok(())
    }
}
