//! LLM client implementations and system-prompt loading.

pub mod echo;
pub mod openai;

use std::path::Path;

use threadline_types::config::AppConfig;
use threadline_types::error::CompletionError;

pub use echo::EchoClient;
pub use openai::OpenAiClient;

/// Resolve the system prompt once at start-up.
///
/// `prompt_file` wins over the inline `system_prompt`. An unreadable or empty
/// prompt file is an error rather than a silent fallback.
pub async fn load_system_prompt(config: &AppConfig) -> Result<String, CompletionError> {
    match &config.prompt_file {
        Some(path) => read_prompt_file(path).await,
        None => Ok(config.system_prompt.clone()),
    }
}

async fn read_prompt_file(path: &Path) -> Result<String, CompletionError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CompletionError::Prompt(format!("{}: {e}", path.display())))?;
    let prompt = content.trim();
    if prompt.is_empty() {
        return Err(CompletionError::Prompt(format!("{} is empty", path.display())));
    }
    tracing::debug!(path = %path.display(), "loaded system prompt");
    Ok(prompt.to_string())
}
