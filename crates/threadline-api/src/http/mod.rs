//! HTTP layer: Slack Events API and interactivity webhooks.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
