//! Attachment handling: describe incoming attachments as text and extract
//! inline images as base64 data URLs.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::Message;
use thiserror::Error;

use crate::chat::{InlineImage, UserInput};

/// Command prefix forcing file-mode rendering of the reply.
const FILE_COMMAND: &str = "/file";

#[derive(Debug, Error)]
enum FetchError {
    #[error("telegram api error: {0}")]
    Request(#[from] teloxide::RequestError),
    #[error("download failed: {0}")]
    Download(#[from] teloxide::DownloadError),
    #[error("non-image mime: {0}")]
    NotImage(String),
}

/// Build the platform-neutral input for a chat message: text (with the
/// `/file` prefix stripped), caption, attachment description lines, and any
/// inline images. The second value reports whether file-mode rendering was
/// requested.
pub async fn build_user_input(bot: &Bot, msg: &Message) -> (UserInput, bool) {
    let (text, respond_as_file) = strip_file_prefix(msg.text().unwrap_or_default());

    let mut parts = Vec::new();
    if !text.is_empty() {
        parts.push(text);
    }
    if let Some(caption) = msg.caption() {
        if !caption.is_empty() {
            parts.push(format!("Caption: {caption}"));
        }
    }

    let (attachment_parts, images) = describe_attachments(bot, msg).await;
    parts.extend(attachment_parts);

    (
        UserInput {
            text: parts.join("\n"),
            images,
        },
        respond_as_file,
    )
}

/// Detect and strip a leading `/file` command, case-insensitively.
fn strip_file_prefix(text: &str) -> (String, bool) {
    if text
        .get(..FILE_COMMAND.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(FILE_COMMAND))
    {
        (text[FILE_COMMAND.len()..].trim().to_string(), true)
    } else {
        (text.to_string(), false)
    }
}

/// Describe every attachment on the message and fetch the ones that can ride
/// along as inline images (photos, image documents, image animations). Fetch
/// failures are logged and the attachment stays description-only.
async fn describe_attachments(bot: &Bot, msg: &Message) -> (Vec<String>, Vec<InlineImage>) {
    let mut parts = Vec::new();
    let mut images = Vec::new();

    if let Some(doc) = msg.document() {
        let mime = mime_label(doc.mime_type.as_ref());
        parts.push(format_document(
            doc.file_name.as_deref().unwrap_or("unnamed"),
            doc.file.size,
            &mime,
        ));
        if is_image_mime(&mime) {
            match fetch_data_url(bot, &doc.file.id, &mime).await {
                Ok(data_url) => images.push(InlineImage { data_url }),
                Err(err) => tracing::warn!("could not fetch image document: {err}"),
            }
        }
    }

    if let Some(best) = msg.photo().and_then(|sizes| sizes.last()) {
        parts.push(format_photo(best.width, best.height, best.file.size));
        match fetch_data_url(bot, &best.file.id, "image/jpeg").await {
            Ok(data_url) => images.push(InlineImage { data_url }),
            Err(err) => tracing::warn!("could not fetch photo: {err}"),
        }
    }

    if let Some(audio) = msg.audio() {
        parts.push(format_audio(
            audio.title.as_deref().unwrap_or("untitled"),
            audio.duration.seconds(),
            audio.file.size,
            &mime_label(audio.mime_type.as_ref()),
        ));
    }

    if let Some(voice) = msg.voice() {
        parts.push(format_voice(
            voice.duration.seconds(),
            voice.file.size,
            &mime_label(voice.mime_type.as_ref()),
        ));
    }

    if let Some(video) = msg.video() {
        parts.push(format_video(
            video.width,
            video.height,
            video.duration.seconds(),
            video.file.size,
            &mime_label(video.mime_type.as_ref()),
        ));
    }

    if let Some(note) = msg.video_note() {
        parts.push(format_video_note(
            note.length,
            note.duration.seconds(),
            note.file.size,
        ));
    }

    if let Some(sticker) = msg.sticker() {
        parts.push(format_sticker(
            sticker.set_name.as_deref().unwrap_or("unknown"),
            sticker.emoji.as_deref().unwrap_or(""),
        ));
    }

    if let Some(animation) = msg.animation() {
        let mime = mime_label(animation.mime_type.as_ref());
        parts.push(format_animation(
            animation.file_name.as_deref().unwrap_or("unnamed"),
            animation.file.size,
            &mime,
        ));
        if is_image_mime(&mime) {
            match fetch_data_url(bot, &animation.file.id, &mime).await {
                Ok(data_url) => images.push(InlineImage { data_url }),
                Err(err) => tracing::warn!("could not fetch animation image: {err}"),
            }
        }
    }

    (parts, images)
}

/// Download a file from the Bot API and encode it as an image data URL.
///
/// The Bot API exposes no content type for downloads, so the declared mime
/// wins, then an extension guess from the file path, then `fallback_mime`;
/// anything that does not resolve to an image is rejected.
async fn fetch_data_url(
    bot: &Bot,
    file_id: &str,
    fallback_mime: &str,
) -> Result<String, FetchError> {
    let file = bot.get_file(file_id).await?;

    let mut buffer = Cursor::new(Vec::new());
    bot.download_file(&file.path, &mut buffer).await?;
    let data = buffer.into_inner();

    let mime = resolve_image_mime(fallback_mime, &file.path)?;
    Ok(format!("data:{mime};base64,{}", BASE64.encode(data)))
}

/// Pick an image mime for a downloaded file, or refuse.
fn resolve_image_mime(declared: &str, path: &str) -> Result<String, FetchError> {
    if is_image_mime(declared) {
        return Ok(declared.to_string());
    }
    let guessed = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default();
    if is_image_mime(&guessed) {
        return Ok(guessed);
    }
    let label = if declared.is_empty() || declared == "unknown" {
        if guessed.is_empty() { "unknown".to_string() } else { guessed }
    } else {
        declared.to_string()
    };
    Err(FetchError::NotImage(label))
}

fn is_image_mime(mime: &str) -> bool {
    mime.to_ascii_lowercase().starts_with("image/")
}

fn mime_label(mime: Option<&mime_guess::Mime>) -> String {
    mime.map_or_else(|| "unknown".to_string(), |m| m.essence_str().to_string())
}

fn format_document(name: &str, size: u32, mime: &str) -> String {
    format!("Document: {name} ({size} bytes, mime {mime}).")
}

fn format_photo(width: u32, height: u32, size: u32) -> String {
    format!("Photo: resolution {width}x{height} ({size} bytes).")
}

fn format_audio(title: &str, duration: u32, size: u32, mime: &str) -> String {
    format!("Audio: {title} ({duration} sec, {size} bytes, mime {mime}).")
}

fn format_voice(duration: u32, size: u32, mime: &str) -> String {
    format!("Voice message: duration {duration} sec ({size} bytes, mime {mime}).")
}

fn format_video(width: u32, height: u32, duration: u32, size: u32, mime: &str) -> String {
    format!("Video: resolution {width}x{height} ({duration} sec, {size} bytes, mime {mime}).")
}

fn format_video_note(length: u32, duration: u32, size: u32) -> String {
    format!("Video note: resolution {length}x{length} ({duration} sec, {size} bytes).")
}

fn format_sticker(set_name: &str, emoji: &str) -> String {
    format!("Sticker received: set {set_name}, emoji {emoji}")
}

fn format_animation(name: &str, size: u32, mime: &str) -> String {
    format!("Animation: {name} ({size} bytes, mime {mime}).")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_file_prefix_variants() {
        assert_eq!(strip_file_prefix("/file hello"), ("hello".to_string(), true));
        assert_eq!(strip_file_prefix("/FILE hello"), ("hello".to_string(), true));
        assert_eq!(strip_file_prefix("/file"), (String::new(), true));
        assert_eq!(strip_file_prefix("hello"), ("hello".to_string(), false));
        assert_eq!(strip_file_prefix(""), (String::new(), false));
    }

    #[test]
    fn test_resolve_image_mime_prefers_declared() {
        assert_eq!(
            resolve_image_mime("image/png", "photos/file_1.jpg").unwrap(),
            "image/png"
        );
    }

    #[test]
    fn test_resolve_image_mime_guesses_from_extension() {
        assert_eq!(
            resolve_image_mime("application/octet-stream", "photos/file_1.jpg").unwrap(),
            "image/jpeg"
        );
        assert_eq!(
            resolve_image_mime("unknown", "animations/pic.png").unwrap(),
            "image/png"
        );
    }

    #[test]
    fn test_resolve_image_mime_rejects_non_images() {
        let err = resolve_image_mime("application/pdf", "documents/report.pdf").unwrap_err();
        assert!(err.to_string().contains("application/pdf"));

        let err = resolve_image_mime("unknown", "documents/archive.bin").unwrap_err();
        assert!(matches!(err, FetchError::NotImage(_)));
    }

    #[test]
    fn test_description_lines_match_wire_text() {
        assert_eq!(
            format_document("report.pdf", 1024, "application/pdf"),
            "Document: report.pdf (1024 bytes, mime application/pdf)."
        );
        assert_eq!(
            format_photo(640, 480, 9000),
            "Photo: resolution 640x480 (9000 bytes)."
        );
        assert_eq!(
            format_audio("song", 180, 4096, "audio/mpeg"),
            "Audio: song (180 sec, 4096 bytes, mime audio/mpeg)."
        );
        assert_eq!(
            format_voice(5, 2048, "audio/ogg"),
            "Voice message: duration 5 sec (2048 bytes, mime audio/ogg)."
        );
        assert_eq!(
            format_video(1280, 720, 30, 100_000, "video/mp4"),
            "Video: resolution 1280x720 (30 sec, 100000 bytes, mime video/mp4)."
        );
        assert_eq!(
            format_video_note(240, 10, 50_000),
            "Video note: resolution 240x240 (10 sec, 50000 bytes)."
        );
        assert_eq!(
            format_sticker("cats", "\u{1f638}"),
            "Sticker received: set cats, emoji \u{1f638}"
        );
        assert_eq!(
            format_animation("fun.gif", 777, "image/gif"),
            "Animation: fun.gif (777 bytes, mime image/gif)."
        );
    }
}
