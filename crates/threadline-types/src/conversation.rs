//! Thread-scoped conversation history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Ordered history of the messages sharing one thread id.
///
/// Messages are kept sorted by `created_at` ascending (ties by timestamp
/// string, then insertion order). A conversation always holds at least one
/// message; the only constructors take the thread-starting message or a
/// non-empty history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    thread_id: String,
    channel: String,
    initiator: String,
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation from its first accepted message.
    pub fn new(first: Message) -> Self {
        Self {
            thread_id: first.thread_id().to_string(),
            channel: first.channel().to_string(),
            initiator: first.from().to_string(),
            messages: vec![first],
        }
    }

    /// Rebuild a conversation from stored parts, sorting the history.
    ///
    /// Returns `None` for an empty history.
    pub fn from_parts(
        thread_id: impl Into<String>,
        channel: impl Into<String>,
        initiator: impl Into<String>,
        messages: Vec<Message>,
    ) -> Option<Self> {
        if messages.is_empty() {
            return None;
        }
        let mut conversation = Self {
            thread_id: thread_id.into(),
            channel: channel.into(),
            initiator: initiator.into(),
            messages,
        };
        conversation.sort_chronologically();
        Some(conversation)
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Identity that opened the thread.
    pub fn initiator(&self) -> &str {
        &self.initiator
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn first_message(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_from_initiator(&self, message: &Message) -> bool {
        self.initiator == message.from()
    }

    /// Whether a message with this timestamp is already recorded.
    pub fn contains_timestamp(&self, timestamp: &str) -> bool {
        self.messages.iter().any(|m| m.timestamp() == timestamp)
    }

    /// Append a message unless one with the same timestamp exists.
    ///
    /// Returns `true` when the message was added. Callers that append out of
    /// chronological order must call [`Self::sort_chronologically`] before
    /// handing the conversation out.
    pub fn append(&mut self, message: Message) -> bool {
        if self.contains_timestamp(message.timestamp()) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Stable sort by `created_at`, then by raw timestamp.
    pub fn sort_chronologically(&mut self) {
        self.messages.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.timestamp().cmp(b.timestamp()))
        });
    }
}

/// Newline-joined raw texts, one line per message.
impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.messages {
            writeln!(f, "{}", m.raw_text())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(from: &str, text: &str, ts: &str, thread_ts: &str) -> Message {
        Message::new(from, text, ts, thread_ts, "c1")
    }

    #[test]
    fn new_takes_identity_from_first_message() {
        let cv = Conversation::new(msg("u1", "<@bot> hi", "100", ""));
        assert_eq!(cv.thread_id(), "100");
        assert_eq!(cv.channel(), "c1");
        assert_eq!(cv.initiator(), "u1");
        assert_eq!(cv.len(), 1);
    }

    #[test]
    fn append_dedups_on_timestamp() {
        let mut cv = Conversation::new(msg("u1", "<@bot> hi", "100", ""));
        assert!(cv.append(msg("u1", "more", "110", "100")));
        assert!(!cv.append(msg("u1", "edited text", "110", "100")));
        assert_eq!(cv.len(), 2);
    }

    #[test]
    fn sort_orders_by_created_at() {
        let mut cv = Conversation::new(msg("u1", "<@bot> hi", "100", ""));
        cv.append(msg("u1", "third", "130", "100"));
        cv.append(msg("u2", "second", "120", "100"));
        cv.sort_chronologically();
        let ts: Vec<&str> = cv.messages().iter().map(|m| m.timestamp()).collect();
        assert_eq!(ts, vec!["100", "120", "130"]);
    }

    #[test]
    fn from_parts_sorts_and_rejects_empty() {
        assert!(Conversation::from_parts("100", "c1", "u1", Vec::new()).is_none());

        let cv = Conversation::from_parts(
            "100",
            "c1",
            "u1",
            vec![msg("u1", "b", "110.2", "100"), msg("u1", "a", "100", "")],
        )
        .unwrap();
        assert_eq!(cv.first_message().unwrap().timestamp(), "100");
    }

    #[test]
    fn initiator_check() {
        let cv = Conversation::new(msg("u1", "<@bot> hi", "100", ""));
        assert!(cv.is_from_initiator(&msg("u1", "x", "101", "100")));
        assert!(!cv.is_from_initiator(&msg("u2", "x", "102", "100")));
    }

    #[test]
    fn display_joins_raw_texts() {
        let mut cv = Conversation::new(msg("u1", "<@bot> hi", "100", ""));
        cv.append(msg("", "hello there", "101", "100"));
        assert_eq!(cv.to_string(), "<@bot> hi\nhello there\n");
    }
}
