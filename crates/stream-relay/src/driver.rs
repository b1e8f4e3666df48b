//! Runs one request end to end: producer task, renderer, history write.

use crate::queue::relay_channel;
use crate::renderer::{RelayOutcome, RenderConfig, ThrottledRenderer};
use crate::sequencer::FallbackSequencer;
use gptbot_core::{Bot, Chat};
use prompt::ChatMessage;
use std::sync::Arc;
use storage::{ConversationStore, HistoryRole};
use tracing::{debug, error, info, instrument};

/// One chat reply to relay: the placeholder message to edit and the conversation to send.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub user_id: i64,
    pub chat: Chat,
    /// Id of the already-sent placeholder message.
    pub message_id: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Shared relay dependencies; cheap to clone.
#[derive(Clone)]
pub struct Relay {
    sequencer: Arc<FallbackSequencer>,
    bot: Arc<dyn Bot>,
    history: Arc<dyn ConversationStore>,
    config: RenderConfig,
}

impl Relay {
    pub fn new(
        sequencer: Arc<FallbackSequencer>,
        bot: Arc<dyn Bot>,
        history: Arc<dyn ConversationStore>,
        config: RenderConfig,
    ) -> Self {
        Self {
            sequencer,
            bot,
            history,
            config,
        }
    }

    /// Streams the reply into the placeholder and stores it as a bot turn when it completes.
    ///
    /// The producer task is aborted as soon as the renderer returns, whatever the outcome.
    /// A failed history write is logged only.
    #[instrument(skip(self, request), fields(user_id = request.user_id, model = %request.model))]
    pub async fn relay_reply(&self, request: RelayRequest) -> RelayOutcome {
        let (tx, mut rx) = relay_channel();
        let producer = Arc::clone(&self.sequencer).spawn(request.model, request.messages, tx);

        let renderer = ThrottledRenderer::new(
            Arc::clone(&self.bot),
            request.chat,
            request.message_id,
            self.config.clone(),
        );
        let outcome = renderer.run(&mut rx).await;
        drop(rx);

        producer.abort();
        match producer.await {
            Ok(sequencer_outcome) => debug!(outcome = ?sequencer_outcome, "Producer finished"),
            Err(e) if e.is_cancelled() => debug!("Producer aborted"),
            Err(e) => error!(error = %e, "Producer task failed"),
        }

        if let Some(text) = outcome.persistable_text() {
            match self
                .history
                .append(request.user_id, HistoryRole::Bot, text)
                .await
            {
                Ok(()) => info!(chars = text.chars().count(), "Reply stored"),
                Err(e) => error!(error = %e, "Failed to store reply"),
            }
        }
        outcome
    }
}
