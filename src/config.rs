//! Environment-sourced configuration, read once at startup.

use std::time::Duration;

use thiserror::Error;

/// Immutable runtime configuration, passed by value into services and
/// adapters.
#[derive(Clone, Debug)]
pub struct Config {
    /// OpenAI API key. Required.
    pub openai_api_key: String,
    /// Telegram bot token. Required.
    pub telegram_bot_token: String,
    /// Chat completion model.
    pub model: String,
    /// User ids that always pass authorization.
    pub admin_user_ids: Vec<u64>,
    /// Allowed user ids; empty together with the chat list means everyone.
    pub allowed_user_ids: Vec<u64>,
    /// Allowed chat ids; empty together with the user list means everyone.
    pub allowed_chat_ids: Vec<i64>,
    /// Text-to-speech model.
    pub tts_model: String,
    /// Text-to-speech voice preset.
    pub tts_voice: String,
    /// Text-to-speech audio format.
    pub tts_format: String,
    /// Model driving image generation.
    pub image_model: String,
    /// Image output size; empty means upstream default.
    pub image_size: String,
    /// Image quality tier; empty means upstream default.
    pub image_quality: String,
    /// Image output format; empty means upstream default.
    pub image_format: String,
    /// Image background treatment; empty means upstream default.
    pub image_background: String,
    /// System prompt prepended to every completion request.
    pub assistant_prompt: String,
    /// Upper bound on generated tokens per completion.
    pub max_completion_tokens: u32,
    /// Maximum history turns replayed into a request.
    pub context_limit: usize,
    /// Maximum age of history turns replayed into a request.
    pub context_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            telegram_bot_token: String::new(),
            model: "gpt-5.1".to_string(),
            admin_user_ids: Vec::new(),
            allowed_user_ids: Vec::new(),
            allowed_chat_ids: Vec::new(),
            tts_model: "gpt-4o-mini-tts".to_string(),
            tts_voice: "alloy".to_string(),
            tts_format: "opus".to_string(),
            image_model: "gpt-5.1".to_string(),
            image_size: String::new(),
            image_quality: String::new(),
            image_format: String::new(),
            image_background: String::new(),
            assistant_prompt: "You are telegram bot assistant".to_string(),
            max_completion_tokens: 4096,
            context_limit: 20,
            context_ttl: Duration::from_secs(120 * 60),
        }
    }
}

/// Configuration failures, fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential was absent from the environment.
    #[error("OPENAI_API_KEY and TELEGRAM_BOT_TOKEN are required")]
    MissingCredentials,
}

impl Config {
    /// Load configuration from the process environment, with an optional
    /// dotenv-style override file at `env_path` (existing process variables
    /// win over file entries).
    ///
    /// # Errors
    /// [`ConfigError::MissingCredentials`] when the OpenAI key or the
    /// Telegram token is missing; everything else falls back to defaults.
    pub fn load(env_path: &str) -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::from_path(env_path) {
            tracing::debug!("could not read {env_path}: {err}");
        }

        let mut config = Self::default();
        config.model = env_or("OPENAI_MODEL", config.model);
        config.tts_model = env_or("OPENAI_TTS_MODEL", config.tts_model);
        config.tts_voice = env_or("OPENAI_TTS_VOICE", config.tts_voice);
        config.tts_format = env_or("OPENAI_TTS_FORMAT", config.tts_format);
        config.image_model = env_or("OPENAI_IMAGE_MODEL", config.image_model);
        config.image_size = env_or("OPENAI_IMAGE_SIZE", config.image_size);
        config.image_quality = env_or("OPENAI_IMAGE_QUALITY", config.image_quality);
        config.image_format = env_or("OPENAI_IMAGE_FORMAT", config.image_format);
        config.image_background = env_or("OPENAI_IMAGE_BACKGROUND", config.image_background);
        config.assistant_prompt = env_or("ASSISTANT_PROMPT", config.assistant_prompt);
        config.max_completion_tokens = env_int_or("MAX_TOKENS", config.max_completion_tokens);
        config.context_limit = env_int_or("CONTEXT_MESSAGE_LIMIT", config.context_limit);
        config.context_ttl =
            Duration::from_secs(60 * env_int_or("CONTEXT_TTL_MINUTES", 120u64));

        config.openai_api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        config.telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if config.openai_api_key.is_empty() || config.telegram_bot_token.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }

        config.admin_user_ids = parse_ids(&env_or("ADMIN_USER_IDS", String::new()));
        config.allowed_user_ids = parse_ids(&env_or("ALLOWED_TELEGRAM_USER_IDS", String::new()));
        config.allowed_chat_ids = parse_ids(&env_or("ALLOWED_TELEGRAM_CHAT_IDS", String::new()));

        Ok(config)
    }
}

/// Parse a comma-separated id list, skipping entries that do not parse.
fn parse_ids<T: std::str::FromStr>(raw: &str) -> Vec<T> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("skipping id {part:?}: not a valid integer");
                None
            }
        })
        .collect()
}

fn env_or(key: &str, default: String) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default,
    }
}

fn env_int_or<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return default;
    }
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("invalid integer for {key}={raw:?}, using default {default}");
            default
        }
    }
}
