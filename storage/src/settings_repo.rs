//! Per-user model selection stored in the `users` table.

use crate::error::StorageError;
use crate::models::UserSettings;
use crate::repository::SettingsStore;
use crate::sqlite_pool::SqlitePoolManager;
use crate::DEFAULT_MODEL;
use async_trait::async_trait;
use tracing::info;

#[derive(Clone)]
pub struct SettingsRepository {
    pool_manager: SqlitePoolManager,
    default_model: String,
}

impl SettingsRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    /// Builds the repository on an existing pool (shared with [`crate::HistoryRepository`]).
    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self {
            pool_manager,
            default_model: DEFAULT_MODEL.to_string(),
        };
        repo.init().await?;
        Ok(repo)
    }

    /// Overrides the model returned for users without a stored selection.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                model TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    pub async fn get_settings(&self, user_id: i64) -> Result<Option<UserSettings>, StorageError> {
        let settings = sqlx::query_as::<_, UserSettings>(
            "SELECT user_id, model FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(settings)
    }
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get_model(&self, user_id: i64) -> Result<String, StorageError> {
        Ok(self
            .get_settings(user_id)
            .await?
            .map(|s| s.model)
            .unwrap_or_else(|| self.default_model.clone()))
    }

    async fn set_model(&self, user_id: i64, model: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO users (user_id, model) VALUES (?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET model = excluded.model",
        )
        .bind(user_id)
        .bind(model)
        .execute(self.pool_manager.pool())
        .await?;

        info!(user_id = user_id, model = %model, "User model updated");
        Ok(())
    }
}
