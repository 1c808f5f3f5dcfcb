//! Image generation adapter over the responses endpoint.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayError;
use crate::image::{GeneratedImage, ImageClient, ImageRequest};

use super::{OpenAiClient, RESPONSES_URL};

/// Format assumed when the request leaves it blank.
const DEFAULT_IMAGE_FORMAT: &str = "png";

#[async_trait]
impl ImageClient for OpenAiClient {
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, GatewayError> {
        if request.model.trim().is_empty() {
            return Err(GatewayError::Malformed("image model is required".to_string()));
        }

        let body = ResponsesBody {
            model: request.model.clone(),
            input: request.prompt.clone(),
            tools: vec![ImageTool {
                kind: "image_generation",
                size: blank_to_none(&request.size),
                quality: blank_to_none(&request.quality),
                format: blank_to_none(&request.format),
                background: blank_to_none(&request.background),
            }],
            tool_choice: ToolChoice {
                kind: "image_generation",
            },
        };

        let response = self.post_json(RESPONSES_URL, &body).await?;
        let payload: ResponsesPayload = response.json().await?;
        decode_image(payload, &request.format)
    }
}

/// Find the first image generation result and decode its base64 payload.
fn decode_image(
    payload: ResponsesPayload,
    requested_format: &str,
) -> Result<GeneratedImage, GatewayError> {
    let result = payload
        .output
        .into_iter()
        .find(|item| item.kind == "image_generation_call" && !item.result.trim().is_empty())
        .ok_or_else(|| {
            GatewayError::Malformed("no image generation result in response".to_string())
        })?;

    let data = BASE64.decode(result.result.trim())?;
    let format = {
        let trimmed = requested_format.trim();
        if trimmed.is_empty() {
            DEFAULT_IMAGE_FORMAT.to_string()
        } else {
            trimmed.to_string()
        }
    };

    Ok(GeneratedImage { data, format })
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
struct ResponsesBody {
    model: String,
    input: String,
    tools: Vec<ImageTool>,
    tool_choice: ToolChoice,
}

#[derive(Serialize)]
struct ImageTool {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<String>,
}

#[derive(Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ResponsesPayload {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    result: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> ResponsesPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_image_finds_generation_call() {
        let payload = payload(
            r#"{"output":[
                {"type":"reasoning"},
                {"type":"image_generation_call","result":"aGVsbG8="}
            ]}"#,
        );
        let image = decode_image(payload, "png").unwrap();
        assert_eq!(image.data, b"hello");
        assert_eq!(image.format, "png");
    }

    #[test]
    fn test_decode_image_blank_format_falls_back() {
        let payload = payload(r#"{"output":[{"type":"image_generation_call","result":"aGk="}]}"#);
        assert_eq!(decode_image(payload, "  ").unwrap().format, "png");
    }

    #[test]
    fn test_decode_image_rejects_missing_result() {
        let missing = payload(r#"{"output":[{"type":"message"}]}"#);
        assert!(matches!(
            decode_image(missing, "png"),
            Err(GatewayError::Malformed(_))
        ));

        let blank = payload(r#"{"output":[{"type":"image_generation_call","result":"  "}]}"#);
        assert!(decode_image(blank, "png").is_err());

        let empty = payload(r#"{"output":[]}"#);
        assert!(decode_image(empty, "png").is_err());
    }

    #[test]
    fn test_decode_image_rejects_bad_base64() {
        let payload = payload(
            r#"{"output":[{"type":"image_generation_call","result":"not base64!!"}]}"#,
        );
        assert!(matches!(
            decode_image(payload, "png"),
            Err(GatewayError::Decode(_))
        ));
    }

    #[test]
    fn test_tool_serializes_only_set_options() {
        let tool = ImageTool {
            kind: "image_generation",
            size: blank_to_none("1024x1024"),
            quality: blank_to_none(""),
            format: blank_to_none(" "),
            background: blank_to_none("transparent"),
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["type"], "image_generation");
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["background"], "transparent");
        assert!(json.get("quality").is_none());
        assert!(json.get("format").is_none());
    }
}
