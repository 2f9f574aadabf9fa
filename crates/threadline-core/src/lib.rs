//! Conversation engine and collaborator ports for Threadline.
//!
//! This crate defines the "ports" (store, LLM, chat and responder traits)
//! that the infrastructure layer implements, plus the engagement policy and
//! the bot orchestrator. It depends only on `threadline-types` -- never on
//! `threadline-infra` or any database/IO crate.

pub mod bot;
pub mod chat;
pub mod engagement;
pub mod llm;
pub mod responder;
pub mod store;
