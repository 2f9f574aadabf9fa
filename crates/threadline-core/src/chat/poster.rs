//! ChatPoster trait definition.

use threadline_types::error::PostError;
use threadline_types::message::Message;

/// Sends replies back to the chat platform.
///
/// `reply` carries the target channel and thread (see [`Message::reply`]).
/// Implementations live in threadline-infra (`SlackPoster`).
pub trait ChatPoster: Send + Sync {
    /// Transport name reported by `debug vars`, e.g. "slack.webhook".
    fn name(&self) -> &str;

    /// Post `reply` as plain text.
    fn post_message(
        &self,
        reply: &Message,
    ) -> impl std::future::Future<Output = Result<(), PostError>> + Send;

    /// Post `reply`, rendering each fenced code block with a "run" action.
    fn post_actionable_message(
        &self,
        reply: &Message,
    ) -> impl std::future::Future<Output = Result<(), PostError>> + Send;
}
