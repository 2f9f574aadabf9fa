//! Slack glue: request signing, Block Kit rendering and reply posting.

pub mod blocks;
pub mod poster;
pub mod signature;

pub use poster::SlackPoster;
pub use signature::{SignatureError, verify_slack_signature};
