//! Assembly: builds stores, providers, image clients and the handler chain from [`BotConfig`],
//! then runs the Telegram dispatcher.

use anyhow::{Context, Result};
use gptbot_core::{init_tracing, Bot};
use gptbot_telegram::{run_dispatcher, TelegramBotAdapter};
use handler_chain::HandlerChain;
use handlers::CommandHandler;
use image_generation_client::{FusionBrainClient, ImageGenerator, OpenAiImageClient};
use image_handlers::{ConversationStates, ImageGenerators, ImageHandler};
use llm_client::{
    mask_token, ChatProvider, OpenAiCompatibleProvider, PlainTextProvider, RateLimitSentinel,
    TransportOptions,
};
use llm_handlers::ChatRelayHandler;
use std::sync::Arc;
use storage::{
    ConversationStore, HistoryRepository, SettingsRepository, SettingsStore, SqlitePoolManager,
};
use stream_relay::{FallbackSequencer, Relay};
use tracing::{info, instrument};

use crate::config::{BotConfig, ProviderKind};

/// Providers in fallback order, named `<kind>-<position>` for logs.
pub fn build_providers(config: &BotConfig) -> Vec<Arc<dyn ChatProvider>> {
    config
        .providers
        .iter()
        .enumerate()
        .map(|(i, entry)| -> Arc<dyn ChatProvider> {
            match entry.kind {
                ProviderKind::OpenAi => Arc::new(OpenAiCompatibleProvider::new(
                    format!("openai-{}", i + 1),
                    config.openai_api_key.clone(),
                    entry.url.clone(),
                )),
                ProviderKind::PlainText => Arc::new(PlainTextProvider::new(
                    format!("text-{}", i + 1),
                    entry.url.clone(),
                )),
            }
        })
        .collect()
}

pub fn build_sequencer(config: &BotConfig) -> FallbackSequencer {
    FallbackSequencer::new(build_providers(config))
        .with_options(TransportOptions::default().with_timeout(config.provider_timeout))
        .with_sentinel(RateLimitSentinel::new([config.rate_limit_sentinel.clone()]))
        .with_require_non_empty(config.require_non_empty)
}

/// Kandinsky is only wired when FusionBrain credentials are configured.
pub fn build_image_generators(config: &BotConfig) -> ImageGenerators {
    let default: Arc<dyn ImageGenerator> = Arc::new(OpenAiImageClient::with_base_url(
        config.image_api_key.clone(),
        config.image_base_url.clone(),
    ));
    let kandinsky = config.fusion_brain.as_ref().map(|fb| -> Arc<dyn ImageGenerator> {
        Arc::new(
            FusionBrainClient::new(&fb.url, fb.api_key.clone(), fb.secret_key.clone())
                .with_style(fb.style)
                .with_dimensions(fb.dimensions.clone()),
        )
    });
    ImageGenerators { default, kandinsky }
}

/// Chain order: commands and menu, then image requests, then chat relay.
pub fn build_handler_chain(
    config: &BotConfig,
    bot: Arc<dyn Bot>,
    settings: Arc<dyn SettingsStore>,
    history: Arc<dyn ConversationStore>,
) -> HandlerChain {
    let sequencer = Arc::new(build_sequencer(config));
    let relay = Relay::new(
        sequencer.clone(),
        bot.clone(),
        history.clone(),
        config.render.clone(),
    );

    let commands = CommandHandler::new(bot.clone(), settings.clone(), history.clone())
        .with_start_model(config.start_model.clone())
        .with_history_limit(config.history_limit);
    let images = ImageHandler::new(
        bot.clone(),
        settings.clone(),
        sequencer,
        build_image_generators(config),
        Arc::new(ConversationStates::new()),
    )
    .with_enhance_model(config.default_model.clone());
    let chat = ChatRelayHandler::new(bot, settings, history, relay)
        .with_system_prompt(config.system_prompt.clone())
        .with_history_limit(config.history_limit);

    HandlerChain::new()
        .add_handler(Arc::new(commands))
        .add_handler(Arc::new(images))
        .add_handler(Arc::new(chat))
}

/// Opens the history and settings stores on one shared SQLite pool.
pub async fn open_stores(
    config: &BotConfig,
) -> Result<(Arc<dyn ConversationStore>, Arc<dyn SettingsStore>)> {
    let pool = SqlitePoolManager::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let history = HistoryRepository::with_pool(pool.clone())
        .await
        .context("Failed to initialize history table")?;
    let settings = SettingsRepository::with_pool(pool)
        .await
        .context("Failed to initialize settings table")?
        .with_default_model(config.default_model.clone());
    Ok((Arc::new(history), Arc::new(settings)))
}

/// Main entry: init logging, validate config, build components, then run the dispatcher.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file, config.log_format)?;

    info!(
        database_url = %config.database_url,
        providers = config.providers.len(),
        openai_key = %mask_token(&config.openai_api_key),
        kandinsky = config.fusion_brain.is_some(),
        "Initializing bot"
    );

    let teloxide_bot = config.telegram.build_bot()?;
    let (history, settings) = open_stores(&config).await?;
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let chain = build_handler_chain(&config, bot, settings, history);

    info!(handlers = chain.len(), "Bot started successfully");
    run_dispatcher(teloxide_bot, chain).await
}
