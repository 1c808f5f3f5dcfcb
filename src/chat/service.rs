//! The conversation orchestrator.

use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::gateway::GatewayError;
use crate::history::{ConversationStore, Message, Role};

use super::client::{CompletionClient, CompletionRequest, TurnMessage};

/// Placeholder persisted in place of image bytes, so replayed history still
/// hints that an attachment occurred.
const IMAGE_MARKER: &str = "[image attached]";

/// Platform-neutral inbound input: free text plus zero or more inline images.
#[derive(Clone, Debug, Default)]
pub struct UserInput {
    /// Message text, already enriched with attachment descriptions.
    pub text: String,
    /// Inline images extracted from attachments.
    pub images: Vec<InlineImage>,
}

/// An image forwarded inline with the new turn.
#[derive(Clone, Debug)]
pub struct InlineImage {
    /// The image as a `data:<mime>;base64,…` URL.
    pub data_url: String,
}

/// Errors from handling a chat message.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The input carried neither text nor images.
    #[error("message cannot be empty")]
    EmptyMessage,
    /// The completion gateway failed; propagated untouched.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Turns an inbound message into a reply, maintaining conversation context.
#[derive(Clone)]
pub struct ChatService {
    store: Arc<ConversationStore>,
    client: Arc<dyn CompletionClient>,
    config: Config,
}

impl ChatService {
    /// Create a service over the given store and completion gateway.
    pub fn new(
        store: Arc<ConversationStore>,
        client: Arc<dyn CompletionClient>,
        config: Config,
    ) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    /// Handle one inbound message and return the assistant's reply.
    ///
    /// Fresh history is read before the new user turn is appended, so the new
    /// turn is never counted against its own context window. On success the
    /// reply is appended as an assistant turn; on gateway failure the user
    /// turn stays in history and the error is propagated untouched.
    ///
    /// # Errors
    /// [`ChatError::EmptyMessage`] for vacuous input, or the gateway failure.
    pub async fn handle_message(
        &self,
        chat_id: i64,
        input: UserInput,
    ) -> Result<String, ChatError> {
        if input.text.trim().is_empty() && input.images.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let user_message = Message::user(stored_content(&input));

        let history = self.store.fresh_messages(
            chat_id,
            self.config.context_limit,
            self.config.context_ttl,
        );
        self.store.add(chat_id, user_message);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(TurnMessage::text(
            Role::System,
            self.config.assistant_prompt.clone(),
        ));
        for turn in history {
            messages.push(TurnMessage::text(turn.role, turn.content));
        }
        messages.push(TurnMessage {
            role: Role::User,
            text: input.text.clone(),
            images: input.images.iter().map(|i| i.data_url.clone()).collect(),
        });

        let reply = self
            .client
            .complete(CompletionRequest {
                model: self.config.model.clone(),
                messages,
                max_completion_tokens: self.config.max_completion_tokens,
            })
            .await?;

        self.store.add(chat_id, Message::assistant(reply.clone()));

        Ok(reply)
    }
}

/// Text persisted for a user turn: trimmed input, plus the image marker when
/// at least one image came in.
fn stored_content(input: &UserInput) -> String {
    let mut content = input.text.trim().to_string();
    if !input.images.is_empty() {
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(IMAGE_MARKER);
    }
    content
}
