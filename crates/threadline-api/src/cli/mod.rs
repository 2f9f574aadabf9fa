//! CLI command definitions for the `threadline` binary.

pub mod conversation;
pub mod serve;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use threadline_types::config::{AppConfig, LlmBackend, StoreBackend};

/// Slack conversation bot backed by a language model.
#[derive(Parser)]
#[command(name = "threadline", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the Slack event and interaction webhooks.
    Serve(ServeArgs),

    /// Inspect stored conversations.
    Conversation {
        #[command(subcommand)]
        action: ConversationCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConversationCommand {
    /// Print one thread's stored conversation.
    Show {
        /// Thread timestamp, e.g. 1685790080.123456.
        thread_id: String,
    },
}

/// Flags for `serve`. Each one overrides `config.toml` and the environment.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// LLM backend: echo or openai.
    #[arg(long, env = "THREADLINE_LLM")]
    pub llm: Option<LlmBackend>,

    /// Conversation store: memory, sqlite or document.
    #[arg(long, env = "THREADLINE_STORE")]
    pub store: Option<StoreBackend>,

    /// Slack incoming-webhook URL used for plain replies.
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    pub webhook: Option<String>,

    /// File holding the system prompt.
    #[arg(long)]
    pub prompt: Option<PathBuf>,

    /// Host to bind to.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Identity the bot answers to in mentions.
    #[arg(long)]
    pub bot_id: Option<String>,
}

impl ServeArgs {
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(llm) = self.llm {
            config.llm = llm;
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(url) = self.webhook {
            config.slack.webhook_url = Some(url);
        }
        if let Some(prompt) = self.prompt {
            config.prompt_file = Some(prompt);
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bot_id) = self.bot_id {
            config.bot_id = bot_id;
        }
    }
}
