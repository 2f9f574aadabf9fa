//! Normalized chat message.
//!
//! A [`Message`] is one inbound or outbound chat event reduced to the fields
//! the conversation engine cares about. `text`, `thread_id`, `message_id` and
//! `created_at` are derived on access so they can never drift from the raw
//! fields they are computed from.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mention::{mention_target, strip_mention_markup};

/// One chat event.
///
/// Two messages are equal only when every raw field matches; dedup inside a
/// conversation uses the `timestamp` alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    from: String,
    raw_text: String,
    timestamp: String,
    #[serde(default)]
    thread_timestamp: String,
    channel: String,
}

impl Message {
    /// Build a message from its raw platform fields.
    ///
    /// `thread_timestamp` is empty when the message starts a thread.
    pub fn new(
        from: impl Into<String>,
        raw_text: impl Into<String>,
        timestamp: impl Into<String>,
        thread_timestamp: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            raw_text: raw_text.into(),
            timestamp: timestamp.into(),
            thread_timestamp: thread_timestamp.into(),
            channel: channel.into(),
        }
    }

    /// Build an outbound reply addressed to an existing thread.
    ///
    /// Replies carry no sender and no timestamp of their own; the platform
    /// assigns one when the message is posted.
    pub fn reply(
        channel: impl Into<String>,
        thread_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            from: String::new(),
            raw_text: text.into(),
            timestamp: String::new(),
            thread_timestamp: thread_id.into(),
            channel: channel.into(),
        }
    }

    /// Unique id of the message within its thread (the platform timestamp).
    pub fn message_id(&self) -> &str {
        &self.timestamp
    }

    /// Conversation key: the thread timestamp, or this message's own
    /// timestamp when it starts the thread.
    pub fn thread_id(&self) -> &str {
        if self.thread_timestamp.is_empty() {
            &self.timestamp
        } else {
            &self.thread_timestamp
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    /// Text exactly as delivered, mention markup included.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Text with the leading mention token stripped.
    pub fn text(&self) -> String {
        strip_mention_markup(&self.raw_text)
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn thread_timestamp(&self) -> &str {
        &self.thread_timestamp
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Whether this message starts a new thread.
    pub fn starts_thread(&self) -> bool {
        self.thread_timestamp.is_empty()
    }

    /// Point in time parsed from the platform timestamp.
    ///
    /// Slack timestamps are `seconds.fraction` strings. Unparseable values
    /// map to the Unix epoch so they sort first instead of failing.
    pub fn created_at(&self) -> DateTime<Utc> {
        parse_platform_timestamp(&self.timestamp).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Identity targeted by this message's first mention, or `""`.
    pub fn mention_target(&self) -> String {
        mention_target(&self.raw_text)
    }

    /// Whether this message is a directed mention of `id`.
    pub fn is_mention_of(&self, id: &str) -> bool {
        !id.is_empty() && self.mention_target() == id
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.from, self.raw_text)
    }
}

/// Parse a `seconds[.fraction]` timestamp without going through `f64`.
///
/// The fraction is read as a decimal and scaled to nanoseconds; digits past
/// the ninth are dropped.
pub fn parse_platform_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = match ts.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (ts, ""),
    };

    let secs: i64 = secs.parse().ok()?;
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let digits: String = frac.chars().take(9).collect();
    let nanos = if digits.is_empty() {
        0
    } else {
        let scale = 10u32.pow(9 - digits.len() as u32);
        digits.parse::<u32>().ok()? * scale
    };

    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn msg(text: &str, ts: &str, thread_ts: &str) -> Message {
        Message::new("human", text, ts, thread_ts, "c1")
    }

    #[test]
    fn thread_id_is_own_timestamp_for_thread_start() {
        let m = msg("hi", "100.000001", "");
        assert_eq!(m.thread_id(), "100.000001");
        assert!(m.starts_thread());
    }

    #[test]
    fn thread_id_is_thread_timestamp_for_replies() {
        let m = msg("hi", "110.000001", "100.000001");
        assert_eq!(m.thread_id(), "100.000001");
        assert!(!m.starts_thread());
    }

    #[test]
    fn message_id_is_timestamp() {
        let m = msg("hi", "110.5", "100.1");
        assert_eq!(m.message_id(), "110.5");
    }

    #[test]
    fn text_strips_user_mention() {
        assert_eq!(msg("<@U01J9JZQZ8M> hello", "1", "").text(), "hello");
    }

    #[test]
    fn text_strips_subteam_mention() {
        assert_eq!(msg("<!subteam^S01J9JZQZ8M> hello", "1", "").text(), "hello");
    }

    #[test]
    fn raw_text_keeps_markup() {
        let m = msg("<@U1> hello", "1", "");
        assert_eq!(m.raw_text(), "<@U1> hello");
    }

    #[test]
    fn mention_of_subteam() {
        let m = msg("<!subteam^S01J9JZQZ8M> hello", "1", "");
        assert!(m.is_mention_of("S01J9JZQZ8M"));
        assert!(!m.is_mention_of("U999"));
    }

    #[test]
    fn empty_id_is_never_mentioned() {
        assert!(!msg("no mention here", "1", "").is_mention_of(""));
    }

    #[test]
    fn created_at_keeps_nanosecond_precision() {
        let m = msg("hi", "1685790080.750000128", "");
        let want = Utc.with_ymd_and_hms(2023, 6, 3, 11, 1, 20).unwrap()
            + chrono::Duration::nanoseconds(750_000_128);
        assert_eq!(m.created_at(), want);
    }

    #[test]
    fn created_at_short_fraction_scales() {
        let m = msg("hi", "100.5", "");
        assert_eq!(m.created_at().timestamp_subsec_nanos(), 500_000_000);
        assert_eq!(m.created_at().timestamp(), 100);
    }

    #[test]
    fn created_at_without_fraction() {
        assert_eq!(msg("hi", "100", "").created_at().timestamp(), 100);
    }

    #[test]
    fn created_at_unparseable_is_epoch() {
        assert_eq!(msg("hi", "not-a-ts", "").created_at(), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(msg("hi", "", "").created_at(), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(msg("hi", "12.3a", "").created_at(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn reply_targets_thread() {
        let r = Message::reply("c1", "100.1", "answer");
        assert_eq!(r.from(), "");
        assert_eq!(r.thread_id(), "100.1");
        assert_eq!(r.channel(), "c1");
        assert_eq!(r.raw_text(), "answer");
    }

    #[test]
    fn display_shows_sender_and_raw_text() {
        assert_eq!(msg("<@U1> hi", "1", "").to_string(), "human: <@U1> hi");
    }
}
