//! Mock [`gptbot_core::Bot`] recording every edit with the (tokio) time it happened.

use async_trait::async_trait;
use gptbot_core::{Bot, BotError, Chat, InlineKeyboard, Keyboard, PhotoSource, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct EditRecord {
    pub message_id: String,
    pub text: String,
    pub at: Instant,
}

/// Records edits to `edit_tx`; the next edit calls fail with the queued errors, in order.
pub struct MockBot {
    edit_tx: mpsc::UnboundedSender<EditRecord>,
    edit_failures: Mutex<VecDeque<BotError>>,
}

impl MockBot {
    pub fn with_receiver() -> (Arc<Self>, mpsc::UnboundedReceiver<EditRecord>) {
        Self::failing_with(Vec::new())
    }

    pub fn failing_with(
        failures: Vec<BotError>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<EditRecord>) {
        let (edit_tx, edit_rx) = mpsc::unbounded_channel();
        let bot = Arc::new(Self {
            edit_tx,
            edit_failures: Mutex::new(failures.into()),
        });
        (bot, edit_rx)
    }
}

#[allow(dead_code)]
pub fn drain(rx: &mut mpsc::UnboundedReceiver<EditRecord>) -> Vec<EditRecord> {
    let mut edits = Vec::new();
    while let Ok(edit) = rx.try_recv() {
        edits.push(edit);
    }
    edits
}

#[allow(dead_code)]
pub fn test_chat() -> Chat {
    Chat {
        id: 456,
        chat_type: "private".to_string(),
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _chat: &Chat, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn send_message_and_return_id(&self, _chat: &Chat, _text: &str) -> Result<String> {
        Ok("1".to_string())
    }

    async fn send_message_with_keyboard(
        &self,
        _chat: &Chat,
        _text: &str,
        _keyboard: &Keyboard,
    ) -> Result<String> {
        Ok("1".to_string())
    }

    async fn edit_message(&self, _chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        let _ = self.edit_tx.send(EditRecord {
            message_id: message_id.to_string(),
            text: text.to_string(),
            at: Instant::now(),
        });
        let failure = self.edit_failures.lock().unwrap().pop_front();
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn edit_message_with_keyboard(
        &self,
        _chat: &Chat,
        _message_id: &str,
        _text: &str,
        _keyboard: &InlineKeyboard,
    ) -> Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _chat: &Chat, _message_id: &str) -> Result<()> {
        Ok(())
    }

    async fn send_photo(
        &self,
        _chat: &Chat,
        _photo: PhotoSource,
        _caption: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }

    async fn answer_callback(&self, _callback_id: &str, _text: Option<&str>) -> Result<()> {
        Ok(())
    }
}
