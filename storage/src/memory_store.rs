//! In-memory stores for tests and runs without a database file.

use crate::error::StorageError;
use crate::models::{HistoryEntry, HistoryRole};
use crate::repository::{ConversationStore, SettingsStore};
use crate::DEFAULT_MODEL;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Conversation history kept in a `Vec` per process; ids are assigned in append order.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries of `user_id`, oldest first.
    pub async fn entries_for(&self, user_id: i64) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(
        &self,
        user_id: i64,
        role: HistoryRole,
        content: &str,
    ) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let id = entries.last().map(|e| e.id + 1).unwrap_or(1);
        entries.push(HistoryEntry {
            id,
            user_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn read_recent(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, StorageError> {
        let all = self.entries_for(user_id).await;
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn clear(&self, user_id: i64) -> Result<u64, StorageError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.user_id != user_id);
        Ok((before - entries.len()) as u64)
    }
}

#[derive(Debug)]
pub struct InMemorySettingsStore {
    models: RwLock<HashMap<i64, String>>,
    default_model: String,
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_model(&self, user_id: i64) -> Result<String, StorageError> {
        Ok(self
            .models
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| self.default_model.clone()))
    }

    async fn set_model(&self, user_id: i64, model: &str) -> Result<(), StorageError> {
        self.models
            .write()
            .await
            .insert(user_id, model.to_string());
        Ok(())
    }
}
