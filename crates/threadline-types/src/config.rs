//! Configuration types for Threadline.
//!
//! `AppConfig` mirrors `config.toml` in the data directory. Every field has a
//! default so an empty file (or no file) yields a working in-memory echo bot.
//! Credentials never live here; they are read from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which conversation store backs the bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
    Document,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::Document => write!(f, "document"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "document" => Ok(StoreBackend::Document),
            other => Err(format!("invalid store backend: '{other}'")),
        }
    }
}

/// Which LLM collaborator generates replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    #[default]
    Echo,
    OpenAi,
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmBackend::Echo => write!(f, "echo"),
            LlmBackend::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echo" => Ok(LlmBackend::Echo),
            "openai" => Ok(LlmBackend::OpenAi),
            other => Err(format!("invalid llm backend: '{other}'")),
        }
    }
}

/// Top-level configuration, loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identity the bot answers to in mentions.
    #[serde(default)]
    pub bot_id: String,

    #[serde(default)]
    pub store: StoreBackend,

    /// SQLite URL for the `sqlite` store. Defaults to a file in the data dir.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Directory for the `document` store. Defaults to `{data_dir}/conversations`.
    #[serde(default)]
    pub document_dir: Option<PathBuf>,

    #[serde(default)]
    pub llm: LlmBackend,

    #[serde(default)]
    pub openai: OpenAiSettings,

    /// File holding the system prompt. Takes precedence over `system_prompt`.
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Deadline for one engagement (LLM call plus reply post).
    #[serde(default = "default_timeout_secs")]
    pub response_timeout_secs: u64,

    /// Deadline for one interactive "run" action.
    #[serde(default = "default_timeout_secs")]
    pub responder_timeout_secs: u64,

    /// Upper bound on detached responses in flight.
    #[serde(default = "default_max_concurrent_responses")]
    pub max_concurrent_responses: usize,

    /// How long shutdown waits for in-flight responses.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    /// Channels the bot listens in. Empty means every channel.
    #[serde(default)]
    pub allowed_channels: Vec<String>,

    #[serde(default)]
    pub slack: SlackSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_concurrent_responses() -> usize {
    16
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot_id: String::new(),
            store: StoreBackend::default(),
            database_url: None,
            document_dir: None,
            llm: LlmBackend::default(),
            openai: OpenAiSettings::default(),
            prompt_file: None,
            system_prompt: default_system_prompt(),
            response_timeout_secs: default_timeout_secs(),
            responder_timeout_secs: default_timeout_secs(),
            max_concurrent_responses: default_max_concurrent_responses(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            allowed_channels: Vec::new(),
            slack: SlackSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

/// OpenAI-compatible endpoint settings. The API key comes from `OPENAI_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub temperature: f32,
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            base_url: default_openai_base_url(),
            temperature: 0.0,
        }
    }
}

/// Slack Web API settings. Tokens come from `SLACK_BOT_TOKEN` and
/// `SLACK_SIGNING_SECRET`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackSettings {
    #[serde(default = "default_slack_api_base")]
    pub api_base_url: String,

    /// Incoming-webhook URL used for plain posts instead of `chat.postMessage`.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_slack_api_base(),
            webhook_url: None,
        }
    }
}

/// Event webhook listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_event_path")]
    pub event_subscription_path: String,

    #[serde(default = "default_interaction_path")]
    pub interaction_path: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_event_path() -> String {
    "/subscription".to_string()
}

fn default_interaction_path() -> String {
    "/interaction".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            event_subscription_path: default_event_path(),
            interaction_path: default_interaction_path(),
        }
    }
}
