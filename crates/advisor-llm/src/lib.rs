//! Advisor LLM - Claude Messages API integration
//!
//! This crate provides the model integration for Scale Advisor:
//! - Message: conversation types and completion parameters
//! - Claude: the Messages API client and the `CompletionClient` trait
//!   that tools depend on

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claude;
pub mod error;
pub mod message;

pub use claude::{ClaudeClient, ClaudeConfig, CompletionClient};
pub use error::{Error, Result};
pub use message::{
    ChatMessage, CompletionParams, Role, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
