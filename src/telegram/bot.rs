//! Inbound dispatch: authorization, command routing, and reply delivery.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatAction, Message};

use crate::chat::{ChatError, ChatService};
use crate::config::Config;
use crate::image::{ImageError, ImageService};
use crate::speech::{SpeechError, SpeechService};

use super::attachments;
use super::render;

/// The platform adapter: owns the use-case services and translates Telegram
/// updates into calls on them.
pub struct Frontend {
    config: Config,
    chat: ChatService,
    speech: SpeechService,
    image: ImageService,
}

impl Frontend {
    /// Wire the front end to its use-case services.
    pub fn new(
        config: Config,
        chat: ChatService,
        speech: SpeechService,
        image: ImageService,
    ) -> Self {
        Self {
            config,
            chat,
            speech,
            image,
        }
    }

    /// Long-poll for updates until a shutdown signal arrives.
    ///
    /// Every message is handled in its own task; updates are deliberately not
    /// serialized per chat, so two concurrent messages in one conversation
    /// may append to the context store in either order.
    pub async fn dispatch(self: Arc<Self>, bot: Bot) {
        tracing::info!("starting telegram long polling");

        let handler = Update::filter_message().endpoint({
            let frontend = Arc::clone(&self);
            move |bot: Bot, msg: Message| {
                let frontend = Arc::clone(&frontend);
                async move {
                    frontend.handle_update(&bot, &msg).await;
                    respond(())
                }
            }
        });

        Dispatcher::builder(bot, handler)
            .distribution_function(|_| None::<std::convert::Infallible>)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        tracing::info!("telegram polling stopped");
    }

    async fn handle_update(&self, bot: &Bot, msg: &Message) {
        let Some(user) = msg.from.as_ref() else {
            return;
        };

        if !is_allowed(user.id.0, msg.chat.id.0, &self.config) {
            render::send_text(bot, msg.chat.id, msg.id, "access denied").await;
            return;
        }

        let text = msg.text().unwrap_or_default();
        if let Some(args) = command_text(text, "tts") {
            self.handle_tts(bot, msg, &args).await;
            return;
        }
        if let Some(args) = command_text(text, "img") {
            self.handle_img(bot, msg, &args).await;
            return;
        }

        self.handle_chat(bot, msg).await;
    }

    async fn handle_tts(&self, bot: &Bot, msg: &Message, text: &str) {
        if text.trim().is_empty() {
            render::send_text(bot, msg.chat.id, msg.id, "usage: /tts <text>").await;
            return;
        }

        render::send_chat_action(bot, msg.chat.id, ChatAction::UploadVoice).await;
        match self.speech.synthesize(text).await {
            Ok(audio) => {
                if let Err(err) = render::send_voice(bot, msg.chat.id, msg.id, &audio).await {
                    tracing::error!("failed to send voice: {err}");
                    render::send_text(bot, msg.chat.id, msg.id, "could not send voice message")
                        .await;
                }
            }
            Err(SpeechError::EmptyText) => {
                render::send_text(bot, msg.chat.id, msg.id, "i need some text to synthesize")
                    .await;
            }
            Err(err) => {
                tracing::error!("tts request failed: {err}");
                render::send_text(
                    bot,
                    msg.chat.id,
                    msg.id,
                    "failed to generate audio, try again later",
                )
                .await;
            }
        }
    }

    async fn handle_img(&self, bot: &Bot, msg: &Message, prompt: &str) {
        if prompt.trim().is_empty() {
            render::send_text(bot, msg.chat.id, msg.id, "usage: /img <prompt>").await;
            return;
        }

        render::send_chat_action(bot, msg.chat.id, ChatAction::UploadPhoto).await;
        match self.image.generate(prompt).await {
            Ok(image) => {
                if let Err(err) = render::send_photo(bot, msg.chat.id, msg.id, &image).await {
                    tracing::error!("failed to send image: {err}");
                    render::send_text(bot, msg.chat.id, msg.id, "could not send image").await;
                }
            }
            Err(ImageError::EmptyPrompt) => {
                render::send_text(
                    bot,
                    msg.chat.id,
                    msg.id,
                    "i need a prompt to generate an image",
                )
                .await;
            }
            Err(err) => {
                tracing::error!("image generation failed: {err}");
                render::send_text(
                    bot,
                    msg.chat.id,
                    msg.id,
                    "failed to generate image, try again later",
                )
                .await;
            }
        }
    }

    async fn handle_chat(&self, bot: &Bot, msg: &Message) {
        let (input, respond_as_file) = attachments::build_user_input(bot, msg).await;
        let action = if respond_as_file {
            ChatAction::UploadDocument
        } else {
            ChatAction::Typing
        };
        render::send_chat_action(bot, msg.chat.id, action).await;

        let reply = match self.chat.handle_message(msg.chat.id.0, input).await {
            Ok(reply) => reply,
            Err(ChatError::EmptyMessage) => {
                render::send_text(bot, msg.chat.id, msg.id, "i need some content to work with")
                    .await;
                return;
            }
            Err(err) => {
                tracing::error!("openai request failed: {err}");
                render::send_text(
                    bot,
                    msg.chat.id,
                    msg.id,
                    "failed to reach openai, try again later",
                )
                .await;
                return;
            }
        };

        if respond_as_file || render::should_send_as_file(&reply) {
            if let Err(err) = render::send_as_file(bot, msg.chat.id, msg.id, &reply).await {
                tracing::error!("failed to send file: {err}");
                render::send_text(
                    bot,
                    msg.chat.id,
                    msg.id,
                    "could not send file, here is the text",
                )
                .await;
                render::send_text(bot, msg.chat.id, msg.id, &reply).await;
            }
            return;
        }

        render::send_text(bot, msg.chat.id, msg.id, &reply).await;
    }
}

/// Extract the argument text of a `/command`, matching case-insensitively and
/// tolerating a `@botname` suffix. Returns `None` when the text is some other
/// command or not a command at all.
fn command_text(text: &str, command: &str) -> Option<String> {
    let trimmed = text.trim();
    let first = trimmed.split_whitespace().next()?;
    let name = first.to_lowercase();
    let name = name.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or_default();
    if name != command {
        return None;
    }
    Some(trimmed[first.len()..].trim().to_string())
}

/// Allow-list check: admins always pass; with both lists empty everyone
/// passes; otherwise the sender or the chat must be listed.
fn is_allowed(user_id: u64, chat_id: i64, config: &Config) -> bool {
    if config.admin_user_ids.contains(&user_id) {
        return true;
    }
    if config.allowed_user_ids.is_empty() && config.allowed_chat_ids.is_empty() {
        return true;
    }
    config.allowed_user_ids.contains(&user_id) || config.allowed_chat_ids.contains(&chat_id)
}
