//! Engagement policy: does a newly stored message warrant a reply?

use threadline_types::conversation::Conversation;
use threadline_types::message::Message;

/// Decide whether the bot should answer `new_message`.
///
/// The bot only ever continues a thread for the person who started it:
/// - a mention of the bot engages only at the instant it creates the thread
///   (the conversation holds exactly that one message);
/// - a non-mention engages when the thread was opened by this same author
///   mentioning the bot.
///
/// Pure; evaluated again for every accepted message.
pub fn should_respond(conversation: &Conversation, new_message: &Message, bot_id: &str) -> bool {
    let Some(first) = conversation.first_message() else {
        return false;
    };

    if !conversation.is_from_initiator(new_message) {
        return false;
    }

    if new_message.is_mention_of(bot_id) {
        return conversation.len() == 1 && first.timestamp() == new_message.timestamp();
    }

    first.is_mention_of(bot_id) && first.from() == new_message.from()
}
