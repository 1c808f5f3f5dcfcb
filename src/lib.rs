//! Telegram relay bot for an OpenAI-compatible backend.
//!
//! Incoming chat messages are merged with a bounded, time-windowed
//! conversation history and forwarded to a completion API; `/tts` and `/img`
//! commands are one-shot speech and image requests. All state lives in
//! process memory for the lifetime of the process.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod chat;
pub mod config;
pub mod gateway;
pub mod history;
pub mod image;
pub mod openai;
pub mod speech;
pub mod start;
pub mod telegram;
