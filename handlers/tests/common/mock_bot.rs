//! Mock [`gptbot_core::Bot`] that records every call over an mpsc channel.

use async_trait::async_trait;
use gptbot_core::{
    Bot, Chat, InlineKeyboard, Keyboard, Message, PhotoSource, Result, User,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum BotCall {
    Send { text: String },
    SendWithKeyboard { text: String, keyboard: Keyboard },
    Edit { message_id: String, text: String },
    EditWithKeyboard { message_id: String, text: String, keyboard: InlineKeyboard },
    Delete { message_id: String },
    Photo { photo: PhotoSource, caption: Option<String> },
    AnswerCallback { callback_id: String, text: Option<String> },
}

/// Returns increasing message ids ("1", "2", ...) for sent messages.
pub struct MockBot {
    calls: mpsc::UnboundedSender<BotCall>,
    next_id: AtomicUsize,
}

impl MockBot {
    pub fn with_receiver() -> (Arc<Self>, mpsc::UnboundedReceiver<BotCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                calls,
                next_id: AtomicUsize::new(1),
            }),
            rx,
        )
    }

    fn next_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[allow(dead_code)]
pub fn drain(rx: &mut mpsc::UnboundedReceiver<BotCall>) -> Vec<BotCall> {
    let mut calls = Vec::new();
    while let Ok(call) = rx.try_recv() {
        calls.push(call);
    }
    calls
}

#[allow(dead_code)]
pub fn create_test_message(user_id: i64, content: &str) -> Message {
    Message {
        id: "msg_1".to_string(),
        user: User {
            id: user_id,
            username: Some("user".to_string()),
            first_name: Some("User".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> Result<()> {
        let _ = self.calls.send(BotCall::Send {
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_message_and_return_id(&self, _chat: &Chat, text: &str) -> Result<String> {
        let _ = self.calls.send(BotCall::Send {
            text: text.to_string(),
        });
        Ok(self.next_id())
    }

    async fn send_message_with_keyboard(
        &self,
        _chat: &Chat,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<String> {
        let _ = self.calls.send(BotCall::SendWithKeyboard {
            text: text.to_string(),
            keyboard: keyboard.clone(),
        });
        Ok(self.next_id())
    }

    async fn edit_message(&self, _chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        let _ = self.calls.send(BotCall::Edit {
            message_id: message_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn edit_message_with_keyboard(
        &self,
        _chat: &Chat,
        message_id: &str,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<()> {
        let _ = self.calls.send(BotCall::EditWithKeyboard {
            message_id: message_id.to_string(),
            text: text.to_string(),
            keyboard: keyboard.clone(),
        });
        Ok(())
    }

    async fn delete_message(&self, _chat: &Chat, message_id: &str) -> Result<()> {
        let _ = self.calls.send(BotCall::Delete {
            message_id: message_id.to_string(),
        });
        Ok(())
    }

    async fn send_photo(&self, _chat: &Chat, photo: PhotoSource, caption: Option<&str>) -> Result<()> {
        let _ = self.calls.send(BotCall::Photo {
            photo,
            caption: caption.map(str::to_string),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let _ = self.calls.send(BotCall::AnswerCallback {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
