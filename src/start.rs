//! Startup: configuration, logging, adapter wiring, and the event loop.

use std::process::ExitCode;
use std::sync::Arc;

use teloxide::Bot;

use crate::chat::ChatService;
use crate::config::Config;
use crate::history::ConversationStore;
use crate::image::ImageService;
use crate::openai::OpenAiClient;
use crate::speech::SpeechService;
use crate::telegram::Frontend;

/// Run the bot until a shutdown signal arrives.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on configuration or
/// initialization failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("starting chatrelay v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::load(".env") {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("failed to load config: {err}");
            return ExitCode::from(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("failed to create runtime: {err}");
            return ExitCode::from(1);
        }
    };

    if let Err(err) = runtime.block_on(run_bot(config)) {
        tracing::error!("bot stopped with error: {err}");
        return ExitCode::from(1);
    }

    tracing::info!("shutdown complete");
    ExitCode::SUCCESS
}

/// Wire the store, gateways, and services, then poll until shutdown.
async fn run_bot(config: Config) -> anyhow::Result<()> {
    let openai = Arc::new(OpenAiClient::new(&config.openai_api_key)?);
    let store = Arc::new(ConversationStore::new());

    let chat = ChatService::new(Arc::clone(&store), openai.clone(), config.clone());
    let speech = SpeechService::new(openai.clone(), config.clone());
    let image = ImageService::new(openai, config.clone());

    let bot = Bot::new(config.telegram_bot_token.clone());
    let frontend = Arc::new(Frontend::new(config, chat, speech, image));

    frontend.dispatch(bot).await;
    Ok(())
}
