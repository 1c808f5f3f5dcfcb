//! Chat completions adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::{CompletionClient, CompletionRequest, TurnMessage};
use crate::gateway::GatewayError;

use super::{CHAT_COMPLETIONS_URL, OpenAiClient};

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        let body = ChatCompletionBody {
            model: request.model,
            messages: request.messages.iter().map(to_api_message).collect(),
            max_completion_tokens: request.max_completion_tokens,
            stream: false,
        };

        let response = self.post_json(CHAT_COMPLETIONS_URL, &body).await?;
        let payload: ChatCompletionResponse = response.json().await?;
        extract_reply(payload)
    }
}

/// Map a turn to the wire shape: plain string content for text-only turns,
/// multi-part content when images ride along.
fn to_api_message(turn: &TurnMessage) -> ApiMessage {
    if turn.images.is_empty() {
        return ApiMessage {
            role: turn.role.as_str(),
            content: ApiContent::Text(turn.text.clone()),
        };
    }

    let mut parts = Vec::with_capacity(turn.images.len() + 1);
    if !turn.text.trim().is_empty() {
        parts.push(ApiContentPart::Text {
            text: turn.text.clone(),
        });
    }
    for url in &turn.images {
        parts.push(ApiContentPart::ImageUrl {
            image_url: ApiImageUrl {
                url: url.clone(),
                detail: "auto",
            },
        });
    }

    ApiMessage {
        role: turn.role.as_str(),
        content: ApiContent::Parts(parts),
    }
}

/// Pull the first choice's text out of a success payload.
fn extract_reply(payload: ChatCompletionResponse) -> Result<String, GatewayError> {
    payload
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| GatewayError::Malformed("completion returned no choices".to_string()))
}

#[derive(Serialize)]
struct ChatCompletionBody {
    model: String,
    messages: Vec<ApiMessage>,
    max_completion_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: ApiContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Parts(Vec<ApiContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentPart {
    Text { text: String },
    ImageUrl { image_url: ApiImageUrl },
}

#[derive(Serialize)]
struct ApiImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: String,
}
