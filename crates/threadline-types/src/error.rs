use thiserror::Error;

/// Errors from conversation store operations.
///
/// A duplicate message is not an error: stores report it as "not added".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("no conversation found for {0}")]
    NotFound(String),
}

/// Errors from the LLM collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("provider returned no completion")]
    EmptyResponse,

    #[error("context length exceeded")]
    ContextLengthExceeded,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("prompt unavailable: {0}")]
    Prompt(String),
}

/// Errors from the chat-posting collaborator.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("http error: {0}")]
    Http(String),

    #[error("platform rejected message: {0}")]
    Api(String),

    #[error("invalid reply: {0}")]
    InvalidReply(String),
}

/// Errors from the command responder.
///
/// A command that runs and exits non-zero is not an error; its status is
/// reported in the output.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("failed to spawn command: {0}")]
    Spawn(String),

    #[error("command i/o failed: {0}")]
    Io(String),
}

/// Errors surfaced by the bot orchestrator.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("llm completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("posting reply failed: {0}")]
    Post(#[from] PostError),

    #[error("responder failed: {0}")]
    Responder(#[from] ResponderError),

    #[error("response pool is at capacity")]
    Busy,

    #[error("response pool is shutting down")]
    ShuttingDown,

    #[error("response timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("response cancelled")]
    Cancelled,
}
