//! Application state wiring the bot and its collaborators together.
//!
//! `AppState` pins the type-erased ports from `threadline-core` to the
//! concrete infra implementations chosen by configuration.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::SecretString;

use threadline_core::bot::{BotSettings, ChatBot, ResponsePool};
use threadline_core::chat::BoxChatPoster;
use threadline_core::llm::BoxLlmClient;
use threadline_core::responder::BoxCommandResponder;
use threadline_core::store::BoxConversationStore;
use threadline_infra::config::Secrets;
use threadline_infra::document::DocumentConversationStore;
use threadline_infra::llm::{EchoClient, OpenAiClient, load_system_prompt};
use threadline_infra::memory::MemoryConversationStore;
use threadline_infra::responder::BashResponder;
use threadline_infra::slack::SlackPoster;
use threadline_infra::sqlite::{DatabasePool, SqliteConversationStore, default_database_url};
use threadline_types::config::{AppConfig, LlmBackend, StoreBackend};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<ChatBot>,
    pub config: Arc<AppConfig>,
    /// When `None`, inbound requests are not signature-checked.
    pub signing_secret: Option<Arc<SecretString>>,
}

impl AppState {
    pub fn new(bot: Arc<ChatBot>, config: Arc<AppConfig>, signing_secret: Option<SecretString>) -> Self {
        Self {
            bot,
            config,
            signing_secret: signing_secret.map(Arc::new),
        }
    }

    /// Build the store, collaborators and bot described by `config`.
    pub async fn init(config: AppConfig, data_dir: &Path, secrets: Secrets) -> anyhow::Result<Self> {
        let Secrets {
            slack_bot_token,
            slack_signing_secret,
            openai_api_key,
        } = secrets;

        if config.bot_id.is_empty() {
            tracing::warn!("bot_id is not set; no thread can be opened by mention");
        }
        if slack_signing_secret.is_none() {
            tracing::warn!("SLACK_SIGNING_SECRET is not set; inbound requests are not verified");
        }

        let store = build_store(&config, data_dir).await?;
        let llm = build_llm(&config, openai_api_key.as_ref())?;
        let token = slack_bot_token.context("SLACK_BOT_TOKEN is not set")?;
        let chat = build_poster(&config, token)?;
        let system_prompt = load_system_prompt(&config).await?;

        let settings = BotSettings {
            bot_id: config.bot_id.clone(),
            system_prompt,
            response_timeout: Duration::from_secs(config.response_timeout_secs),
            responder_timeout: Duration::from_secs(config.responder_timeout_secs),
            allowed_channels: config.allowed_channels.clone(),
        };

        tracing::info!(
            store = store.name(),
            llm = llm.name(),
            bot_id = %config.bot_id,
            "bot initialized"
        );

        let bot = ChatBot::new(
            store,
            llm,
            chat,
            BoxCommandResponder::new(BashResponder::new()),
            settings,
            ResponsePool::new(config.max_concurrent_responses),
        );

        Ok(Self::new(Arc::new(bot), Arc::new(config), slack_signing_secret))
    }
}

/// Open the conversation store selected by `config.store`.
pub async fn build_store(config: &AppConfig, data_dir: &Path) -> anyhow::Result<BoxConversationStore> {
    let bot_id = config.bot_id.clone();
    let store = match config.store {
        StoreBackend::Memory => BoxConversationStore::new(MemoryConversationStore::new(bot_id)),
        StoreBackend::Sqlite => {
            tokio::fs::create_dir_all(data_dir).await?;
            let url = config
                .database_url
                .clone()
                .unwrap_or_else(|| format!("{}?mode=rwc", default_database_url(data_dir)));
            let pool = DatabasePool::new(&url)
                .await
                .with_context(|| format!("failed to open database {url}"))?;
            BoxConversationStore::new(SqliteConversationStore::new(pool, bot_id))
        }
        StoreBackend::Document => {
            let dir = config
                .document_dir
                .clone()
                .unwrap_or_else(|| data_dir.join("conversations"));
            let store = DocumentConversationStore::open(&dir, bot_id)
                .await
                .with_context(|| format!("failed to open document store {}", dir.display()))?;
            BoxConversationStore::new(store)
        }
    };
    Ok(store)
}

fn build_llm(config: &AppConfig, api_key: Option<&SecretString>) -> anyhow::Result<BoxLlmClient> {
    Ok(match config.llm {
        LlmBackend::Echo => BoxLlmClient::new(EchoClient::new()),
        LlmBackend::OpenAi => {
            let key = api_key.context("OPENAI_API_KEY is required for the openai backend")?;
            BoxLlmClient::new(OpenAiClient::new(key, &config.openai))
        }
    })
}

fn build_poster(config: &AppConfig, token: SecretString) -> anyhow::Result<BoxChatPoster> {
    let poster = SlackPoster::new(token, &config.slack.api_base_url)?
        .with_webhook_url(config.slack.webhook_url.clone());
    Ok(BoxChatPoster::new(poster))
}
