//! Directed-mention markup parsing.
//!
//! Slack renders a mention as inline markup: `<@U01J9JZQZ8M>` for a user and
//! `<!subteam^S01J9JZQZ8M>` for a user group. Only the first mention token in
//! a text is significant.

use std::sync::LazyLock;

use regex::Regex;

/// `<@ID>` or `<!word^ID>`, plus any whitespace that follows the token.
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(!\w+\^|@)(\w+)>\s*").expect("mention pattern is a valid regex")
});

/// Return the identity targeted by the first mention token in `text`.
///
/// Returns an empty string when the text contains no mention.
pub fn mention_target(text: &str) -> String {
    MENTION_RE
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Remove the first mention token (and its trailing whitespace) from `text`.
///
/// Text without a mention is returned unchanged.
pub fn strip_mention_markup(text: &str) -> String {
    MENTION_RE.replace(text, "").into_owned()
}
