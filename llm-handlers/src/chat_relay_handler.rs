//! Chat handler: turns a user's text into a streamed model reply in the same chat.

use async_trait::async_trait;
use gptbot_core::{catalog, Bot, BotError, Handler, HandlerResponse, Message, Result};
use prompt::{build_conversation, ChatMessage};
use std::sync::Arc;
use storage::{ConversationStore, HistoryEntry, HistoryRole, SettingsStore};
use stream_relay::{Relay, RelayRequest};
use tracing::{info, instrument, warn};

/// Text of the message that is sent first and then edited with the streamed reply.
pub fn placeholder_text(model: &str) -> String {
    format!("⏳ Processing request... (Model: {})", model)
}

fn to_chat_message(entry: HistoryEntry) -> ChatMessage {
    match entry.role {
        HistoryRole::User => ChatMessage::user(entry.content),
        HistoryRole::Bot => ChatMessage::assistant(entry.content),
    }
}

/// Relays plain text to the user's selected text model.
///
/// Commands and users whose selected model is an image model are left to other handlers.
pub struct ChatRelayHandler {
    bot: Arc<dyn Bot>,
    settings: Arc<dyn SettingsStore>,
    history: Arc<dyn ConversationStore>,
    relay: Relay,
    system_prompt: Option<String>,
    history_limit: usize,
}

impl ChatRelayHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        settings: Arc<dyn SettingsStore>,
        history: Arc<dyn ConversationStore>,
        relay: Relay,
    ) -> Self {
        Self {
            bot,
            settings,
            history,
            relay,
            system_prompt: Some(prompt::DEFAULT_SYSTEM_MESSAGE.to_string()),
            history_limit: storage::DEFAULT_HISTORY_LIMIT,
        }
    }

    /// `None` or a blank prompt sends no system message.
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Prior turns (read before the new one is stored), then the new turn is appended.
    async fn load_and_record(&self, user_id: i64, text: &str) -> Vec<ChatMessage> {
        let prior = match self.history.read_recent(user_id, self.history_limit).await {
            Ok(entries) => entries.into_iter().map(to_chat_message).collect(),
            Err(e) => {
                warn!(user_id, error = %e, "Failed to read history, continuing without it");
                Vec::new()
            }
        };
        if let Err(e) = self.history.append(user_id, HistoryRole::User, text).await {
            warn!(user_id, error = %e, "Failed to store user turn");
        }
        prior
    }
}

#[async_trait]
impl Handler for ChatRelayHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let text = message.content.trim();
        if text.is_empty() || message.command().is_some() {
            return Ok(HandlerResponse::Continue);
        }

        let user_id = message.user.id;
        let model = self
            .settings
            .get_model(user_id)
            .await
            .map_err(|e| BotError::Database(e.to_string()))?;
        if catalog::is_image_model(&model) {
            return Ok(HandlerResponse::Continue);
        }

        let prior = self.load_and_record(user_id, &message.content).await;
        let messages = build_conversation(self.system_prompt.as_deref(), prior, &message.content);

        let placeholder_id = self
            .bot
            .send_message_and_return_id(&message.chat, &placeholder_text(&model))
            .await?;
        info!(
            model = %model,
            message_count = messages.len(),
            placeholder_id = %placeholder_id,
            "Relaying to model"
        );

        let outcome = self
            .relay
            .relay_reply(RelayRequest {
                user_id,
                chat: message.chat.clone(),
                message_id: placeholder_id,
                model,
                messages,
            })
            .await;
        info!(outcome = ?outcome, "Relay finished");

        Ok(HandlerResponse::Stop)
    }
}
