mod history_entry;
mod user_settings;

pub use history_entry::{HistoryEntry, HistoryRole};
pub use user_settings::UserSettings;
