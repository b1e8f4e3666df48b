//! Throttled renderer: drains the relay queue and edits one message in place.

use crate::message::RelayMessage;
use crate::queue::{RecvOutcome, RelayReceiver};
use gptbot_core::{Bot, BotError, Chat};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, instrument, warn};

/// Minimum time between two intermediate renders.
pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_millis(300);
/// Telegram's message length limit, in characters.
pub const DEFAULT_MAX_LEN: usize = 4096;
/// How long to wait for the next queue item before giving up.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(35);
/// Attempts per render, counting the first one.
pub const DEFAULT_MAX_RENDER_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub interval: Duration,
    pub max_len: usize,
    pub receive_timeout: Duration,
    pub max_render_attempts: u32,
    pub failure_message: String,
    pub timeout_message: String,
    pub empty_message: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RENDER_INTERVAL,
            max_len: DEFAULT_MAX_LEN,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            max_render_attempts: DEFAULT_MAX_RENDER_ATTEMPTS,
            failure_message:
                "⚠️ An error occurred while generating the response, please try again later\nOr choose another model"
                    .to_string(),
            timeout_message: "⌛ Response timed out".to_string(),
            empty_message: "⚠️ The model returned an empty response".to_string(),
        }
    }
}

/// How a render loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// `End` received; carries the full (untruncated) response.
    Completed(String),
    /// `Error` received; carries its cause.
    Failed(String),
    /// Nothing arrived within the receive timeout.
    TimedOut,
    /// The queue closed without a terminal item.
    Abandoned,
}

impl RelayOutcome {
    /// Only completed responses are stored in history.
    pub fn persistable_text(&self) -> Option<&str> {
        match self {
            RelayOutcome::Completed(text) => Some(text),
            _ => None,
        }
    }
}

/// Returns the first `max_len` characters of `text`.
pub fn truncate_head(text: &str, max_len: usize) -> &str {
    match text.char_indices().nth(max_len) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Per-request render state, owned by the renderer only.
#[derive(Debug)]
struct RenderState {
    accumulated_text: String,
    last_render: Instant,
    last_rendered: Option<String>,
}

impl RenderState {
    fn new() -> Self {
        Self {
            accumulated_text: String::new(),
            last_render: Instant::now(),
            last_rendered: None,
        }
    }
}

/// Edits `message_id` in `chat` as queue items arrive.
pub struct ThrottledRenderer {
    bot: Arc<dyn Bot>,
    chat: Chat,
    message_id: String,
    config: RenderConfig,
}

impl ThrottledRenderer {
    pub fn new(
        bot: Arc<dyn Bot>,
        chat: Chat,
        message_id: impl Into<String>,
        config: RenderConfig,
    ) -> Self {
        Self {
            bot,
            chat,
            message_id: message_id.into(),
            config,
        }
    }

    /// Consumes `rx` until a terminal item, a receive timeout or channel close.
    ///
    /// Deltas are never dropped; a render is only deferred until the interval has passed since
    /// the previous one. The terminal item always gets a final render.
    #[instrument(skip(self, rx), fields(chat_id = self.chat.id, message_id = %self.message_id))]
    pub async fn run(&self, rx: &mut RelayReceiver) -> RelayOutcome {
        let mut state = RenderState::new();
        loop {
            match rx.recv_timeout(self.config.receive_timeout).await {
                RecvOutcome::Item(RelayMessage::Delta(delta)) => {
                    state.accumulated_text.push_str(&delta);
                    if state.last_render.elapsed() > self.config.interval {
                        self.render_progress(&mut state).await;
                    }
                }
                RecvOutcome::Item(RelayMessage::End) => {
                    let view = truncate_head(&state.accumulated_text, self.config.max_len);
                    self.render(view).await;
                    debug!(chars = state.accumulated_text.chars().count(), "Relay completed");
                    return RelayOutcome::Completed(state.accumulated_text);
                }
                RecvOutcome::Item(RelayMessage::Error(cause)) => {
                    error!(cause = %cause, "Relay failed");
                    self.render(&self.config.failure_message).await;
                    return RelayOutcome::Failed(cause);
                }
                RecvOutcome::Timeout => {
                    error!(
                        timeout_secs = self.config.receive_timeout.as_secs_f32(),
                        "Timed out waiting for the response"
                    );
                    self.render(&self.config.timeout_message).await;
                    return RelayOutcome::TimedOut;
                }
                RecvOutcome::Closed => {
                    warn!("Relay queue closed without a terminal item");
                    self.render(&self.config.empty_message).await;
                    return RelayOutcome::Abandoned;
                }
            }
        }
    }

    /// Intermediate render; skipped when the visible text has not changed (frozen at max length).
    async fn render_progress(&self, state: &mut RenderState) {
        let view = truncate_head(&state.accumulated_text, self.config.max_len);
        if state.last_rendered.as_deref() == Some(view) {
            return;
        }
        if self.render(view).await {
            state.last_rendered = Some(view.to_string());
        }
        state.last_render = Instant::now();
    }

    /// Replaces the message text, sleeping and retrying on retry-after up to the attempt cap.
    /// Returns whether the host accepted the text.
    async fn render(&self, text: &str) -> bool {
        let max_attempts = self.config.max_render_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self
                .bot
                .edit_message(&self.chat, &self.message_id, text)
                .await
            {
                Ok(()) | Err(BotError::NotModified) => return true,
                Err(BotError::RetryAfter(wait)) if attempt < max_attempts => {
                    warn!(
                        retry_after_secs = wait.as_secs_f32(),
                        attempt, "Render rate limited, waiting"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(error = %e, attempt, "Failed to render message");
                    return false;
                }
            }
        }
    }
}
