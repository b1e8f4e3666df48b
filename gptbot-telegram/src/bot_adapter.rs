//! Wraps teloxide::Bot and implements [`gptbot_core::Bot`], classifying Telegram failures into
//! the core error variants the relay and handler chain act on.

use async_trait::async_trait;
use gptbot_core::{
    Bot as CoreBot, BotError, Chat, InlineKeyboard, Keyboard, PhotoSource, Result,
};
use teloxide::{
    prelude::*,
    types::{
        CallbackQueryId, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
        KeyboardButton, KeyboardMarkup, MessageId, ReplyMarkup,
    },
    ApiError, RequestError,
};

/// Maps a teloxide request failure to [`BotError`].
///
/// Rate limits keep their wait duration, "message is not modified" becomes
/// [`BotError::NotModified`], and blocked/kicked/deactivated/missing chats become
/// [`BotError::RecipientUnreachable`].
pub fn map_request_error(error: RequestError) -> BotError {
    match error {
        RequestError::RetryAfter(seconds) => BotError::RetryAfter(seconds.duration()),
        RequestError::Api(ApiError::MessageNotModified) => BotError::NotModified,
        RequestError::Api(
            api @ (ApiError::BotBlocked
            | ApiError::BotKicked
            | ApiError::BotKickedFromSupergroup
            | ApiError::UserDeactivated
            | ApiError::ChatNotFound),
        ) => BotError::RecipientUnreachable(api.to_string()),
        other => BotError::Bot(other.to_string()),
    }
}

fn parse_message_id(message_id: &str) -> Result<MessageId> {
    message_id
        .parse::<i32>()
        .map(MessageId)
        .map_err(|_| BotError::Bot(format!("Invalid message_id: {}", message_id)))
}

fn inline_markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.text.clone(), b.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

fn reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Inline(inline) => ReplyMarkup::InlineKeyboard(inline_markup(inline)),
        Keyboard::Reply(reply) => {
            let markup = KeyboardMarkup::new(reply.rows.iter().map(|row| {
                row.iter()
                    .map(|label| KeyboardButton::new(label.clone()))
                    .collect::<Vec<_>>()
            }));
            let markup = if reply.resize {
                markup.resize_keyboard()
            } else {
                markup
            };
            ReplyMarkup::Keyboard(markup)
        }
    }
}

/// Thin wrapper around teloxide::Bot that implements gptbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(sent.id.to_string())
    }

    async fn send_message_with_keyboard(
        &self,
        chat: &Chat,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .reply_markup(reply_markup(keyboard))
            .await
            .map_err(map_request_error)?;
        Ok(sent.id.to_string())
    }

    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .edit_message_text(ChatId(chat.id), id, text)
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn edit_message_with_keyboard(
        &self,
        chat: &Chat,
        message_id: &str,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .edit_message_text(ChatId(chat.id), id, text)
            .reply_markup(inline_markup(keyboard))
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .delete_message(ChatId(chat.id), id)
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat: &Chat,
        photo: PhotoSource,
        caption: Option<&str>,
    ) -> Result<()> {
        let file = match photo {
            PhotoSource::Url(url) => {
                let url = reqwest::Url::parse(&url)
                    .map_err(|e| BotError::Bot(format!("Invalid photo URL {}: {}", url, e)))?;
                InputFile::url(url)
            }
            PhotoSource::Bytes(bytes) => InputFile::memory(bytes).file_name("image.png"),
        };
        let request = self.bot.send_photo(ChatId(chat.id), file);
        let request = match caption {
            Some(caption) => request.caption(caption.to_string()),
            None => request,
        };
        request.await.map_err(map_request_error)?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        let request = match text {
            Some(text) => request.text(text.to_string()),
            None => request,
        };
        request.await.map_err(map_request_error)?;
        Ok(())
    }
}
