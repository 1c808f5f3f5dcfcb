//! Text-to-speech: a stateless one-shot request, no conversation state.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::gateway::GatewayError;

/// A single synthesis call.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechRequest {
    /// TTS model name.
    pub model: String,
    /// Voice preset.
    pub voice: String,
    /// Requested audio container format, may be empty.
    pub format: String,
    /// Text to speak.
    pub text: String,
}

/// Synthesized audio.
#[derive(Clone, Debug)]
pub struct SpeechAudio {
    /// Raw audio bytes.
    pub data: Vec<u8>,
    /// Container format the bytes are in.
    pub format: String,
}

/// Stateless gateway performing exactly one synthesis call per invocation.
#[async_trait]
pub trait SpeechClient: Send + Sync {
    /// Synthesize speech for the given request.
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, GatewayError>;
}

/// Errors from speech synthesis.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The text was empty or whitespace; no upstream call was made.
    #[error("text cannot be empty")]
    EmptyText,
    /// The speech gateway failed; propagated untouched.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Turns text into audio using the configured model, voice, and format.
#[derive(Clone)]
pub struct SpeechService {
    client: Arc<dyn SpeechClient>,
    config: Config,
}

impl SpeechService {
    /// Create a service over the given speech gateway.
    pub fn new(client: Arc<dyn SpeechClient>, config: Config) -> Self {
        Self { client, config }
    }

    /// Synthesize speech for `text`.
    ///
    /// Blank input fails fast locally; a paid upstream call is never made for
    /// a vacuous request.
    ///
    /// # Errors
    /// [`SpeechError::EmptyText`] for blank input, or the gateway failure.
    pub async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let audio = self
            .client
            .synthesize(SpeechRequest {
                model: self.config.tts_model.clone(),
                voice: self.config.tts_voice.clone(),
                format: self.config.tts_format.clone(),
                text: text.to_string(),
            })
            .await?;
        Ok(audio)
    }
}
