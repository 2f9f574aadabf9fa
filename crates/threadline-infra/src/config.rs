//! Configuration loader for Threadline.
//!
//! Reads `config.toml` from the data directory (`~/.threadline/` in
//! production) into [`AppConfig`], then overlays environment variables.
//! Falls back to defaults when the file is missing or malformed.
//! Credentials are only ever read from the environment into [`Secrets`].

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use threadline_types::config::AppConfig;

pub const ENV_DATA_DIR: &str = "THREADLINE_DATA_DIR";
pub const ENV_BOT_ID: &str = "CHATBOT_BOT_ID";
pub const ENV_SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const ENV_SLACK_SIGNING_SECRET: &str = "SLACK_SIGNING_SECRET";
pub const ENV_SLACK_CHANNELS: &str = "SLACK_CHANNELS";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_DATABASE_URL: &str = "THREADLINE_DATABASE_URL";

/// Resolve the data directory.
///
/// Priority: `THREADLINE_DATA_DIR`, then `~/.threadline`, then `./.threadline`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".threadline");
    }

    PathBuf::from(".threadline")
}

/// Load `{data_dir}/config.toml` and apply environment overrides.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config = load_config_file(data_dir).await;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load `{data_dir}/config.toml` only.
///
/// - Missing file: [`AppConfig::default()`].
/// - Unreadable or unparseable file: logs a warning and returns the default.
pub async fn load_config_file(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Overlay environment variables read through `lookup`.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(bot_id) = get(ENV_BOT_ID) {
        config.bot_id = bot_id.trim().to_string();
    }
    if let Some(url) = get(ENV_DATABASE_URL) {
        config.database_url = Some(url);
    }
    if let Some(channels) = get(ENV_SLACK_CHANNELS) {
        config.allowed_channels = parse_channel_list(&channels);
    }
    config
}

/// Split a comma-separated channel list, dropping blanks.
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Credentials read from the environment. Does NOT derive Debug.
#[derive(Default)]
pub struct Secrets {
    pub slack_bot_token: Option<SecretString>,
    pub slack_signing_secret: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| SecretString::from(v.trim().to_string()))
        };
        Self {
            slack_bot_token: get(ENV_SLACK_BOT_TOKEN),
            slack_signing_secret: get(ENV_SLACK_SIGNING_SECRET),
            openai_api_key: get(ENV_OPENAI_API_KEY),
        }
    }
}
