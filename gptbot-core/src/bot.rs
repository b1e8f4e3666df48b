//! Bot abstraction for sending, editing and deleting messages.
//!
//! [`Bot`] is transport-agnostic; gptbot-telegram implements it via teloxide and tests substitute
//! recording mocks.

use crate::error::Result;
use crate::keyboard::{InlineKeyboard, Keyboard};
use crate::types::{Chat, PhotoSource};
use async_trait::async_trait;

/// Abstraction for the messaging host. Implementations map to a transport (e.g. Telegram).
///
/// `message_id` values are transport-specific strings (Telegram uses numeric ids).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a message and returns its id, for later [`Bot::edit_message`] while streaming.
    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String>;

    /// Sends a message with an attached keyboard and returns its id.
    async fn send_message_with_keyboard(
        &self,
        chat: &Chat,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<String>;

    /// Replaces the text of an already-sent message.
    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()>;

    /// Replaces text and inline keyboard of an already-sent message.
    async fn edit_message_with_keyboard(
        &self,
        chat: &Chat,
        message_id: &str,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<()>;

    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()>;

    /// Sends a photo by URL or raw bytes, with an optional caption.
    async fn send_photo(&self, chat: &Chat, photo: PhotoSource, caption: Option<&str>)
        -> Result<()>;

    /// Acknowledges a callback query; `text` is shown as a short toast when present.
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
