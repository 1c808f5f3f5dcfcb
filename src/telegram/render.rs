//! Outbound rendering: chunked text, file, voice, and photo delivery.

use teloxide::payloads::{
    SendDocumentSetters, SendMessageSetters, SendPhotoSetters, SendVoiceSetters,
};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, MessageId, ReplyParameters};

use crate::image::GeneratedImage;
use crate::speech::SpeechAudio;

/// Telegram message length ceiling we chunk against.
pub const TEXT_CHUNK_SIZE: usize = 2048;

/// File name used when a reply is delivered as a document.
const RESPONSE_FILE_NAME: &str = "response.md";

/// Whether a reply is too long for chunked text delivery.
#[must_use]
pub fn should_send_as_file(text: &str) -> bool {
    text.chars().count() > TEXT_CHUNK_SIZE
}

/// Split text into chunks of at most `chunk_size` characters (not bytes).
#[must_use]
pub fn split_text(text: &str, chunk_size: usize) -> Vec<String> {
    if chunk_size == 0 {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }
    chars
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Voice attachment file name for a requested audio format.
///
/// Telegram expects voice notes in an OGG container, so `opus` maps to `ogg`.
#[must_use]
pub fn voice_file_name(format: &str) -> String {
    let ext = match format.trim() {
        "" | "opus" => "ogg",
        other => other,
    };
    format!("voice.{ext}")
}

/// Photo attachment file name for a requested image format.
#[must_use]
pub fn image_file_name(format: &str) -> String {
    let ext = match format.trim() {
        "" => "png",
        "jpeg" => "jpg",
        other => other,
    };
    format!("image.{ext}")
}

/// Send a reply as chunked text. Only the first chunk carries the reply-to
/// reference; per-chunk delivery failures are logged, not propagated.
pub async fn send_text(bot: &Bot, chat_id: ChatId, reply_to: MessageId, text: &str) {
    for (idx, chunk) in split_text(text, TEXT_CHUNK_SIZE).into_iter().enumerate() {
        let mut request = bot.send_message(chat_id, chunk);
        if idx == 0 {
            request = request.reply_parameters(ReplyParameters::new(reply_to));
        }
        if let Err(err) = request.await {
            tracing::error!("failed to send reply: {err}");
        }
    }
}

/// Send a reply as a downloadable markdown file.
///
/// # Errors
/// Returns the Telegram API error so the caller can fall back to text.
pub async fn send_as_file(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    content: &str,
) -> Result<(), teloxide::RequestError> {
    let document = InputFile::memory(content.as_bytes().to_vec()).file_name(RESPONSE_FILE_NAME);
    bot.send_document(chat_id, document)
        .reply_parameters(ReplyParameters::new(reply_to))
        .await?;
    Ok(())
}

/// Send synthesized audio as a voice attachment.
///
/// # Errors
/// Returns the Telegram API error so the caller can report the failure.
pub async fn send_voice(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    audio: &SpeechAudio,
) -> Result<(), teloxide::RequestError> {
    let voice = InputFile::memory(audio.data.clone()).file_name(voice_file_name(&audio.format));
    bot.send_voice(chat_id, voice)
        .reply_parameters(ReplyParameters::new(reply_to))
        .await?;
    Ok(())
}

/// Send a generated image as a photo attachment.
///
/// # Errors
/// Returns the Telegram API error so the caller can report the failure.
pub async fn send_photo(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    image: &GeneratedImage,
) -> Result<(), teloxide::RequestError> {
    let photo = InputFile::memory(image.data.clone()).file_name(image_file_name(&image.format));
    bot.send_photo(chat_id, photo)
        .reply_parameters(ReplyParameters::new(reply_to))
        .await?;
    Ok(())
}

/// Send a chat action ahead of slow work; failures are only logged.
pub async fn send_chat_action(bot: &Bot, chat_id: ChatId, action: ChatAction) {
    if let Err(err) = bot.send_chat_action(chat_id, action).await {
        tracing::warn!("failed to send chat action: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_text("hello", TEXT_CHUNK_SIZE), vec!["hello"]);
        assert_eq!(split_text("", TEXT_CHUNK_SIZE), vec![""]);
    }

    #[test]
    fn test_exact_boundary_is_one_chunk() {
        let text = "a".repeat(TEXT_CHUNK_SIZE);
        assert_eq!(split_text(&text, TEXT_CHUNK_SIZE).len(), 1);
    }

    #[test]
    fn test_long_text_splits_without_loss() {
        let text = "a".repeat(TEXT_CHUNK_SIZE * 2 + 5);
        let chunks = split_text(&text, TEXT_CHUNK_SIZE);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), TEXT_CHUNK_SIZE);
        assert_eq!(chunks[1].chars().count(), TEXT_CHUNK_SIZE);
        assert_eq!(chunks[2].chars().count(), 5);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_counts_chars_not_bytes() {
        // Four bytes per char in UTF-8; chunking must not split code points.
        let text = "\u{1f980}".repeat(10);
        let chunks = split_text(&text, 4);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 4);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_zero_chunk_size_returns_whole_text() {
        assert_eq!(split_text("hello", 0), vec!["hello"]);
    }

    #[test]
    fn test_file_threshold() {
        assert!(!should_send_as_file(&"a".repeat(TEXT_CHUNK_SIZE)));
        assert!(should_send_as_file(&"a".repeat(TEXT_CHUNK_SIZE + 1)));
        // Multibyte chars count as one.
        assert!(!should_send_as_file(&"\u{00e9}".repeat(TEXT_CHUNK_SIZE)));
    }

    #[test]
    fn test_voice_file_name_mapping() {
        assert_eq!(voice_file_name("opus"), "voice.ogg");
        assert_eq!(voice_file_name(""), "voice.ogg");
        assert_eq!(voice_file_name(" mp3 "), "voice.mp3");
    }

    #[test]
    fn test_image_file_name_mapping() {
        assert_eq!(image_file_name("jpeg"), "image.jpg");
        assert_eq!(image_file_name(""), "image.png");
        assert_eq!(image_file_name("webp"), "image.webp");
    }
}
