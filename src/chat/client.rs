//! Outbound completion request types and the gateway trait.

use async_trait::async_trait;

use crate::gateway::GatewayError;
use crate::history::Role;

/// One turn of the outbound message list.
///
/// History turns carry text only; images are attached solely to the new user
/// turn and are never replayed from storage.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnMessage {
    /// Author of the turn.
    pub role: Role,
    /// Text content of the turn.
    pub text: String,
    /// Inline images as data URLs, empty for everything but the newest turn.
    pub images: Vec<String>,
}

impl TurnMessage {
    /// Create a text-only turn.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            images: Vec::new(),
        }
    }
}

/// A single completion call: system prompt, history, and the new turn.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    /// Model to complete with.
    pub model: String,
    /// Ordered message list, oldest first.
    pub messages: Vec<TurnMessage>,
    /// Upper bound on generated tokens.
    pub max_completion_tokens: u32,
}

/// Stateless gateway performing exactly one completion call per invocation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a completion and return the generated text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError>;
}
