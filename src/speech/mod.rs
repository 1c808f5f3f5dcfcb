//! Speech synthesis use case.

pub mod service;

pub use service::{SpeechAudio, SpeechClient, SpeechError, SpeechRequest, SpeechService};
