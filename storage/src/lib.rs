//! Storage crate: conversation history and per-user settings.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – HistoryEntry, HistoryRole, UserSettings
//! - [`repository`] – ConversationStore and SettingsStore traits
//! - [`history_repo`] – HistoryRepository (SQLite)
//! - [`settings_repo`] – SettingsRepository (SQLite)
//! - [`memory_store`] – in-memory implementations for tests and ephemeral runs
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod history_repo;
mod memory_store;
mod models;
mod repository;
mod settings_repo;
mod sqlite_pool;

pub use error::StorageError;
pub use history_repo::HistoryRepository;
pub use memory_store::{InMemoryConversationStore, InMemorySettingsStore};
pub use models::{HistoryEntry, HistoryRole, UserSettings};
pub use repository::{ConversationStore, SettingsStore};
pub use settings_repo::SettingsRepository;
pub use sqlite_pool::SqlitePoolManager;

/// Model returned by [`SettingsStore::get_model`] when the user never picked one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Number of history entries replayed to the provider when not configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
