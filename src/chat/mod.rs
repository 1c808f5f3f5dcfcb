//! Conversational use case: history-aware completion requests.

pub mod client;
pub mod service;

pub use client::{CompletionClient, CompletionRequest, TurnMessage};
pub use service::{ChatError, ChatService, InlineImage, UserInput};
