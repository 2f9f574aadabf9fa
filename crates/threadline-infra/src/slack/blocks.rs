//! Block Kit rendering for actionable replies.
//!
//! A reply is split on ```` ``` ```` fences. Even-numbered fields are prose,
//! odd-numbered fields are the contents of a fenced block. Each fenced block
//! becomes a section carrying a "Run" button whose value is the block text,
//! which comes back in the interaction callback as the script to execute.

use serde_json::{Value, json};

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySegment {
    Text(String),
    Command(String),
}

/// Split a reply into prose and fenced-command segments.
///
/// `&amp;` is unescaped first so commands run with a literal `&`. Fields are
/// trimmed and empty fields are dropped; the prose/command alternation follows
/// the field position, not the number of kept segments.
pub fn split_segments(text: &str) -> Vec<ReplySegment> {
    let unescaped = text.replace("&amp;", "&");
    unescaped
        .split(FENCE)
        .enumerate()
        .filter_map(|(n, field)| {
            let field = field.trim();
            if field.is_empty() {
                None
            } else if n % 2 == 0 {
                Some(ReplySegment::Text(field.to_string()))
            } else {
                Some(ReplySegment::Command(field.to_string()))
            }
        })
        .collect()
}

/// Render `text` as Block Kit sections.
///
/// Button action ids are `run-{message_id}-{n}`, or `run-{n}` when the reply
/// has no id yet; `n` is the segment index so ids are unique per message.
pub fn build_blocks(message_id: &str, text: &str) -> Vec<Value> {
    split_segments(text)
        .into_iter()
        .enumerate()
        .map(|(n, segment)| match segment {
            ReplySegment::Text(s) => json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": s },
            }),
            ReplySegment::Command(script) => {
                let action_id = if message_id.is_empty() {
                    format!("run-{n}")
                } else {
                    format!("run-{message_id}-{n}")
                };
                json!({
                    "type": "section",
                    "text": { "type": "mrkdwn", "text": format!("{FENCE}{script}{FENCE}") },
                    "accessory": {
                        "type": "button",
                        "action_id": action_id,
                        "text": { "type": "plain_text", "text": "Run", "emoji": true },
                        "value": script,
                    },
                })
            }
        })
        .collect()
}
