//! Speech synthesis adapter.

use async_trait::async_trait;
use serde::Serialize;

use crate::gateway::GatewayError;
use crate::speech::{SpeechAudio, SpeechClient, SpeechRequest};

use super::{OpenAiClient, SPEECH_URL};

/// Container format assumed when the request leaves it blank.
const DEFAULT_AUDIO_FORMAT: &str = "mp3";

#[async_trait]
impl SpeechClient for OpenAiClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, GatewayError> {
        let format = effective_format(&request.format);
        let body = SpeechBody {
            model: request.model,
            input: request.text,
            voice: request.voice,
            response_format: blank_to_none(&request.format),
        };

        let response = self.post_json(SPEECH_URL, &body).await?;
        let data = response.bytes().await?.to_vec();

        Ok(SpeechAudio { data, format })
    }
}

/// The format the returned bytes are in: the trimmed request format, or the
/// upstream default when blank.
fn effective_format(requested: &str) -> String {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        DEFAULT_AUDIO_FORMAT.to_string()
    } else {
        trimmed.to_string()
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Serialize)]
struct SpeechBody {
    model: String,
    input: String,
    voice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<String>,
}
