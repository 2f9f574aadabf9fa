//! LLM collaborator abstractions.
//!
//! - `LlmClient`: RPITIT trait for concrete completion backends
//! - `BoxLlmClient`: object-safe wrapper for runtime backend selection
//! - `prompt`: role attribution of a conversation into model turns

pub mod box_client;
pub mod client;
pub mod prompt;

pub use box_client::BoxLlmClient;
pub use client::LlmClient;
