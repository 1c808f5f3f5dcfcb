//! OpenAI HTTP adapters: one client implementing the chat, speech, and image
//! gateway traits. Each call is a single attempt; failures map onto
//! [`GatewayError`](crate::gateway::GatewayError) and are never retried here.

pub mod chat;
pub mod image;
pub mod speech;

use std::time::Duration;

use serde::Deserialize;

use crate::gateway::GatewayError;

/// Chat completions endpoint.
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Speech synthesis endpoint.
const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
/// Responses endpoint, used with the image generation tool.
const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Whole-request timeout; generation calls can be slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Shared HTTP client for all OpenAI endpoints.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
}

impl OpenAiClient {
    /// Build a client with the bearer token used for every call.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_key: &str) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }

    /// POST a JSON body to `url` with the bearer token, mapping non-2xx
    /// responses (with the upstream message when parseable) to
    /// [`GatewayError::Status`].
    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response)
    }
}

/// Error envelope common to the OpenAI endpoints.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Extract the upstream error message from a failure body, falling back to a
/// generic placeholder when the body is not the expected envelope.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .map(|error| error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| "no error detail".to_string())
}
