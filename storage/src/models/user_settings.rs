//! Per-user settings row (`users` table).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSettings {
    pub user_id: i64,
    pub model: String,
}
