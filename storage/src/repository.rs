//! Store abstractions consumed by handlers and the relay. Handles are injected, never global.

use crate::error::StorageError;
use crate::models::{HistoryEntry, HistoryRole};
use async_trait::async_trait;

/// Append-only, per-user conversation history.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Appends one turn for `user_id`.
    async fn append(&self, user_id: i64, role: HistoryRole, content: &str)
        -> Result<(), StorageError>;

    /// Returns the `limit` most recent entries for `user_id`, oldest first.
    async fn read_recent(&self, user_id: i64, limit: usize)
        -> Result<Vec<HistoryEntry>, StorageError>;

    /// Deletes all history for `user_id`; returns the number of removed entries.
    async fn clear(&self, user_id: i64) -> Result<u64, StorageError>;
}

/// Per-user model selection; last write wins.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current model for `user_id`, or the store's default when unset.
    async fn get_model(&self, user_id: i64) -> Result<String, StorageError>;

    async fn set_model(&self, user_id: i64, model: &str) -> Result<(), StorageError>;
}
