//! Infrastructure layer for Threadline.
//!
//! Implementations of the ports defined in `threadline-core`: the three
//! conversation stores (in-memory, SQLite, JSON documents), the Slack poster
//! and request verifier, LLM clients, the bash command responder, and
//! configuration loading.

pub mod config;
#[cfg(test)]
mod contract;
pub mod document;
pub mod llm;
pub mod memory;
pub mod responder;
pub mod slack;
pub mod sqlite;
