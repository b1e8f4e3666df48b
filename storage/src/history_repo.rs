//! History repository: append-only conversation log per user.
//!
//! Uses SqlitePoolManager; entries are read back oldest-first, most recent N only.

use crate::error::StorageError;
use crate::models::{HistoryEntry, HistoryRole};
use crate::repository::ConversationStore;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

#[derive(Clone)]
pub struct HistoryRepository {
    pool_manager: SqlitePoolManager,
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    user_id: i64,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = StorageError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<HistoryRole>()
            .map_err(StorageError::CorruptRow)?;
        Ok(HistoryEntry {
            id: row.id,
            user_id: row.user_id,
            role,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

impl HistoryRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    /// Builds the repository on an existing pool (shared with [`crate::SettingsRepository`]).
    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating chat_history table if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chat_history_user_id ON chat_history(user_id, id)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Number of entries stored for `user_id`.
    pub async fn count(&self, user_id: i64) -> Result<i64, StorageError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chat_history WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(self.pool_manager.pool())
                .await?;
        Ok(count)
    }
}

#[async_trait]
impl ConversationStore for HistoryRepository {
    async fn append(
        &self,
        user_id: i64,
        role: HistoryRole,
        content: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO chat_history (user_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(content)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;

        debug!(user_id = user_id, role = %role, len = content.len(), "Appended history entry");
        Ok(())
    }

    async fn read_recent(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, StorageError> {
        // Ids grow with insertion order, so they are the chronological key even when timestamps tie.
        let rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT id, user_id, role, content, created_at FROM chat_history \
             WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(self.pool_manager.pool())
        .await?;

        let mut entries = rows
            .into_iter()
            .map(HistoryEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        entries.reverse();

        debug!(user_id = user_id, count = entries.len(), "Read recent history");
        Ok(entries)
    }

    async fn clear(&self, user_id: i64) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM chat_history WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;

        info!(
            user_id = user_id,
            deleted = result.rows_affected(),
            "Cleared chat history"
        );
        Ok(result.rows_affected())
    }
}
