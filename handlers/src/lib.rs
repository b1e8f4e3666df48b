//! # Command and menu handlers
//!
//! [`CommandHandler`] answers the slash commands (`/start`, `/help`, `/menu`, `/history`,
//! `/delete_history`), the main-menu reply buttons, and the model-selection keyboard callbacks.
//! Keyboard layouts live in [`menu`].

mod command_handler;
pub mod menu;

pub use command_handler::{CommandHandler, DEFAULT_START_MODEL};
