//! Image handler: prompt choice, optional enhancement, generation and delivery.

use crate::conversation_state::ConversationStates;
use async_trait::async_trait;
use gptbot_core::{
    catalog, Bot as CoreBot, BotError, CallbackQuery, Chat, Handler, HandlerResponse,
    InlineButton, InlineKeyboard, Keyboard, Message, PhotoSource, Result,
};
use image_generation_client::{GeneratedImage, ImageGenerator};
use prompt::{fallback_image_prompt, image_prompt_request};
use std::sync::Arc;
use storage::SettingsStore;
use stream_relay::FallbackSequencer;
use tracing::{error, info, instrument, warn};

pub const CALLBACK_ENHANCE: &str = "prompt_enhance";
pub const CALLBACK_RAW: &str = "prompt_raw";

const MSG_CHOOSE_PROMPT: &str = "How should the image prompt be built?";
const MSG_CREATING: &str = "⏳ Creating image...";
const MSG_GENERATION_FAILED: &str = "⚠️ An error occurred while generating the image. Please try again.";
const MSG_NOTHING_PENDING: &str = "Send an image description first.";
const MSG_KANDINSKY_DISABLED: &str = "⚠️ Kandinsky is not configured on this bot.";

fn choice_keyboard() -> Keyboard {
    Keyboard::Inline(InlineKeyboard::from_buttons(
        vec![
            InlineButton::new("✨ Enhance prompt", CALLBACK_ENHANCE),
            InlineButton::new("✏️ Use my text", CALLBACK_RAW),
        ],
        1,
    ))
}

/// Generators by model: Kandinsky goes to its own service, every other image model to the default.
#[derive(Clone)]
pub struct ImageGenerators {
    pub default: Arc<dyn ImageGenerator>,
    pub kandinsky: Option<Arc<dyn ImageGenerator>>,
}

impl ImageGenerators {
    fn for_model(&self, model: &str) -> Option<&Arc<dyn ImageGenerator>> {
        if model.eq_ignore_ascii_case("kandinsky") {
            self.kandinsky.as_ref()
        } else {
            Some(&self.default)
        }
    }
}

pub struct ImageHandler {
    bot: Arc<dyn CoreBot>,
    settings: Arc<dyn SettingsStore>,
    sequencer: Arc<FallbackSequencer>,
    generators: ImageGenerators,
    states: Arc<ConversationStates>,
    /// Text model that rewrites descriptions into image prompts.
    enhance_model: String,
}

impl ImageHandler {
    pub fn new(
        bot: Arc<dyn CoreBot>,
        settings: Arc<dyn SettingsStore>,
        sequencer: Arc<FallbackSequencer>,
        generators: ImageGenerators,
        states: Arc<ConversationStates>,
    ) -> Self {
        Self {
            bot,
            settings,
            sequencer,
            generators,
            states,
            enhance_model: storage::DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_enhance_model(mut self, model: impl Into<String>) -> Self {
        self.enhance_model = model.into();
        self
    }

    async fn user_model(&self, user_id: i64) -> Result<String> {
        self.settings
            .get_model(user_id)
            .await
            .map_err(|e| BotError::Database(e.to_string()))
    }

    /// `None` when the language model reported its rate limit; the request is then abandoned.
    async fn build_prompt(&self, text: &str, enhance: bool) -> Option<String> {
        if !enhance {
            return Some(text.to_string());
        }
        match self
            .sequencer
            .complete(&self.enhance_model, &image_prompt_request(text))
            .await
        {
            Ok(prompt) => Some(prompt.trim().to_string()),
            Err(e) if e.is_rate_limited() => {
                warn!(error = %e, "Prompt enhancement rate limited");
                None
            }
            Err(e) => {
                warn!(error = %e, "Prompt enhancement failed, using plain prompt");
                Some(fallback_image_prompt(text))
            }
        }
    }

    async fn delete_status(&self, chat: &Chat, status_id: &str) {
        if let Err(e) = self.bot.delete_message(chat, status_id).await {
            warn!(error = %e, "Failed to delete status message");
        }
    }

    /// Creates the image and sends it, or an error message. The status message is always removed.
    #[instrument(skip(self, chat, text), fields(chat_id = chat.id))]
    async fn generate_and_send(
        &self,
        chat: &Chat,
        model: &str,
        text: &str,
        enhance: bool,
    ) -> Result<()> {
        let status_id = self.bot.send_message_and_return_id(chat, MSG_CREATING).await?;

        let Some(prompt) = self.build_prompt(text, enhance).await else {
            self.delete_status(chat, &status_id).await;
            return self.bot.send_message(chat, MSG_GENERATION_FAILED).await;
        };

        let Some(generator) = self.generators.for_model(model) else {
            self.delete_status(chat, &status_id).await;
            return self.bot.send_message(chat, MSG_KANDINSKY_DISABLED).await;
        };

        info!(
            model = %model,
            prompt_preview = %prompt.chars().take(100).collect::<String>(),
            "Generating image"
        );
        let result = generator.generate(model, &prompt).await;
        self.delete_status(chat, &status_id).await;

        match result {
            Ok(GeneratedImage::Url(url)) => {
                self.bot.send_photo(chat, PhotoSource::Url(url), None).await
            }
            Ok(GeneratedImage::Bytes(bytes)) => {
                self.bot
                    .send_photo(chat, PhotoSource::Bytes(bytes), None)
                    .await
            }
            Err(e) => {
                error!(error = %e, model = %model, "Image generation failed");
                self.bot.send_message(chat, MSG_GENERATION_FAILED).await
            }
        }
    }
}

#[async_trait]
impl Handler for ImageHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let text = message.content.trim();
        if text.is_empty() || message.command().is_some() {
            return Ok(HandlerResponse::Continue);
        }
        let model = self.user_model(message.user.id).await?;
        if !catalog::is_image_model(&model) {
            return Ok(HandlerResponse::Continue);
        }

        self.states.await_choice(message.user.id, text).await;
        self.bot
            .send_message_with_keyboard(&message.chat, MSG_CHOOSE_PROMPT, &choice_keyboard())
            .await?;
        Ok(HandlerResponse::Stop)
    }

    #[instrument(skip(self, query), fields(user_id = query.user.id, data = %query.data))]
    async fn handle_callback(&self, query: &CallbackQuery) -> Result<HandlerResponse> {
        let enhance = match query.data.as_str() {
            CALLBACK_ENHANCE => true,
            CALLBACK_RAW => false,
            _ => return Ok(HandlerResponse::Continue),
        };

        let (Some(chat), Some(text)) = (
            query.chat.as_ref(),
            self.states.take_pending(query.user.id).await,
        ) else {
            self.bot
                .answer_callback(&query.id, Some(MSG_NOTHING_PENDING))
                .await?;
            return Ok(HandlerResponse::Stop);
        };
        self.bot.answer_callback(&query.id, None).await?;

        if let Some(choice_id) = &query.message_id {
            let label = if enhance {
                "✨ Enhanced prompt"
            } else {
                "✏️ Your text as prompt"
            };
            if let Err(e) = self.bot.edit_message(chat, choice_id, label).await {
                warn!(error = %e, "Failed to update choice message");
            }
        }

        let model = self.user_model(query.user.id).await?;
        self.generate_and_send(chat, &model, &text, enhance).await?;
        Ok(HandlerResponse::Stop)
    }
}
