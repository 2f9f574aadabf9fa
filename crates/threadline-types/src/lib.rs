//! Shared domain types for Threadline.
//!
//! This crate contains the value types of the conversation engine: Message,
//! Conversation, the mention grammar, inbound event payloads, configuration
//! and the error enums shared by every other crate.
//!
//! Zero infrastructure dependencies -- only serde, chrono, regex, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod llm;
pub mod mention;
pub mod message;
