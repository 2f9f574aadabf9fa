//! Role attribution for model input.

use threadline_types::conversation::Conversation;
use threadline_types::llm::{MessageRole, Turn};

/// Flatten a conversation into model turns.
///
/// The system prompt comes first (omitted when blank). Messages from the
/// thread's initiator become `user` turns; everything else, including the
/// bot's own replies, becomes `assistant` turns. Mention markup is stripped.
pub fn conversation_to_turns(conversation: &Conversation, system_prompt: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(conversation.len() + 1);
    if !system_prompt.trim().is_empty() {
        turns.push(Turn::new(MessageRole::System, system_prompt));
    }
    for m in conversation.messages() {
        let role = if conversation.is_from_initiator(m) {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };
        turns.push(Turn::new(role, m.text()));
    }
    turns
}
