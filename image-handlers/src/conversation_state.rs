//! Per-user conversation state for the image prompt choice.

use std::collections::HashMap;
use tokio::sync::Mutex;

/// Where a user is in the image request flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    /// An image description was received; waiting for the enhance/raw choice.
    AwaitingPromptChoice { pending_text: String },
}

/// One state record per user, behind a single lock.
#[derive(Debug, Default)]
pub struct ConversationStates {
    states: Mutex<HashMap<i64, ConversationState>>,
}

impl ConversationStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: i64) -> ConversationState {
        self.states
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Moves the user to `AwaitingPromptChoice`; a newer description replaces an older pending one.
    pub async fn await_choice(&self, user_id: i64, text: impl Into<String>) {
        self.states.lock().await.insert(
            user_id,
            ConversationState::AwaitingPromptChoice {
                pending_text: text.into(),
            },
        );
    }

    /// Returns the pending text and moves the user back to `Idle`. `None` when nothing was pending.
    pub async fn take_pending(&self, user_id: i64) -> Option<String> {
        match self.states.lock().await.remove(&user_id) {
            Some(ConversationState::AwaitingPromptChoice { pending_text }) => Some(pending_text),
            _ => None,
        }
    }

    pub async fn reset(&self, user_id: i64) {
        self.states.lock().await.remove(&user_id);
    }
}
