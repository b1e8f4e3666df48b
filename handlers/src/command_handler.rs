//! Slash commands, main-menu buttons and model keyboard callbacks.

use crate::menu::{
    self, ABOUT_LABEL, CHOOSE_MODEL_LABEL, MODEL_PREFIX, PAGE_PREFIX, TEXT_PAGE,
};
use async_trait::async_trait;
use gptbot_core::{
    catalog, Bot, BotError, CallbackQuery, Chat, Handler, HandlerResponse, Keyboard, Message,
    Result,
};
use std::sync::Arc;
use storage::{ConversationStore, SettingsStore, StorageError};
use tracing::{info, instrument, warn};

/// Model set by `/start`.
pub const DEFAULT_START_MODEL: &str = "GPT-4o";

const MSG_GREETING: &str =
    "Hi! I am a bot that answers with neural networks.\nUse /menu or the button below ⬇️";
const MSG_HELP: &str = "/start - restart the bot\n\
                        /delete_history - delete the dialogue history\n\
                        /history - show the dialogue history\n\
                        /menu - show the keyboard\n";
const MSG_MENU: &str = "Choose an action:";
const MSG_CHOOSE_MODEL: &str = "Choose a model:";
const MSG_ABOUT: &str = "🤖 I am a bot powered by artificial intelligence!\n\
                         Answers are streamed from the configured model providers.";
const MSG_HISTORY_EMPTY: &str = "History is empty.";
const MSG_HISTORY_CLEARED: &str = "✅ Dialogue history cleared!";
const MSG_MODEL_CHANGED: &str = "Model changed!";
const MSG_UNKNOWN_MODEL: &str = "Unknown model, pick one from the list.";

fn storage_err(e: StorageError) -> BotError {
    BotError::Database(e.to_string())
}

pub struct CommandHandler {
    bot: Arc<dyn Bot>,
    settings: Arc<dyn SettingsStore>,
    history: Arc<dyn ConversationStore>,
    start_model: String,
    history_limit: usize,
}

impl CommandHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        settings: Arc<dyn SettingsStore>,
        history: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            bot,
            settings,
            history,
            start_model: DEFAULT_START_MODEL.to_string(),
            history_limit: storage::DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_start_model(mut self, model: impl Into<String>) -> Self {
        self.start_model = model.into();
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    async fn send_main_menu(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message_with_keyboard(chat, text, &Keyboard::Reply(menu::main_menu()))
            .await?;
        Ok(())
    }

    async fn start(&self, message: &Message) -> Result<()> {
        self.settings
            .set_model(message.user.id, &self.start_model)
            .await
            .map_err(storage_err)?;
        info!(user_id = message.user.id, model = %self.start_model, "User started the bot");
        self.send_main_menu(&message.chat, MSG_GREETING).await
    }

    async fn show_history(&self, message: &Message) -> Result<()> {
        let entries = self
            .history
            .read_recent(message.user.id, self.history_limit)
            .await
            .map_err(storage_err)?;
        if entries.is_empty() {
            return self.bot.send_message(&message.chat, MSG_HISTORY_EMPTY).await;
        }
        let lines: Vec<String> = entries
            .iter()
            .map(|e| format!("{}: {}", e.role, e.content))
            .collect();
        let text = format!("Your dialogue history:\n{}", lines.join("\n"));
        self.bot.send_message(&message.chat, &text).await
    }

    async fn delete_history(&self, message: &Message) -> Result<()> {
        let removed = self
            .history
            .clear(message.user.id)
            .await
            .map_err(storage_err)?;
        info!(user_id = message.user.id, removed, "History cleared");
        self.bot.send_message(&message.chat, MSG_HISTORY_CLEARED).await
    }

    async fn show_page(&self, query: &CallbackQuery, page: &str) -> Result<()> {
        let page = page.parse::<u8>().unwrap_or(TEXT_PAGE);
        if let (Some(chat), Some(message_id)) = (&query.chat, &query.message_id) {
            self.bot
                .edit_message_with_keyboard(
                    chat,
                    message_id,
                    menu::page_title(page),
                    &menu::model_keyboard(page),
                )
                .await?;
        }
        self.bot.answer_callback(&query.id, None).await
    }

    async fn select_model(&self, query: &CallbackQuery, model: &str) -> Result<()> {
        if !catalog::is_offered(model) {
            warn!(user_id = query.user.id, model = %model, "Rejected model outside the catalog");
            return self
                .bot
                .answer_callback(&query.id, Some(MSG_UNKNOWN_MODEL))
                .await;
        }
        self.settings
            .set_model(query.user.id, model)
            .await
            .map_err(storage_err)?;
        info!(user_id = query.user.id, model = %model, "Model selected");
        if let (Some(chat), Some(message_id)) = (&query.chat, &query.message_id) {
            let text = format!("✅ You selected model: {}", model);
            if let Err(e) = self.bot.edit_message(chat, message_id, &text).await {
                warn!(error = %e, "Failed to update model keyboard message");
            }
        }
        self.bot
            .answer_callback(&query.id, Some(MSG_MODEL_CHANGED))
            .await
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let chat = &message.chat;
        match message.command() {
            Some("start") => self.start(message).await?,
            Some("help") => self.bot.send_message(chat, MSG_HELP).await?,
            Some("menu") => self.send_main_menu(chat, MSG_MENU).await?,
            Some("history") => self.show_history(message).await?,
            Some("delete_history") => self.delete_history(message).await?,
            Some(_) => return Ok(HandlerResponse::Continue),
            None => match message.content.trim() {
                CHOOSE_MODEL_LABEL => {
                    self.bot
                        .send_message_with_keyboard(
                            chat,
                            MSG_CHOOSE_MODEL,
                            &Keyboard::Inline(menu::model_keyboard(TEXT_PAGE)),
                        )
                        .await?;
                }
                ABOUT_LABEL => self.bot.send_message(chat, MSG_ABOUT).await?,
                _ => return Ok(HandlerResponse::Continue),
            },
        }
        Ok(HandlerResponse::Stop)
    }

    #[instrument(skip(self, query), fields(user_id = query.user.id, data = %query.data))]
    async fn handle_callback(&self, query: &CallbackQuery) -> Result<HandlerResponse> {
        if let Some(page) = query.data.strip_prefix(PAGE_PREFIX) {
            self.show_page(query, page).await?;
        } else if let Some(model) = query.data.strip_prefix(MODEL_PREFIX) {
            self.select_model(query, model).await?;
        } else {
            return Ok(HandlerResponse::Continue);
        }
        Ok(HandlerResponse::Stop)
    }
}
