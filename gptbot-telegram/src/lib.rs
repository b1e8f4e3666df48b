//! # gptbot-telegram
//!
//! Telegram transport: adapters from teloxide types to [`gptbot_core`] types, the
//! [`gptbot_core::Bot`] implementation with Telegram error classification, minimal config, and
//! the dispatcher runner feeding messages and callback queries into a handler chain.
//! No persistence or model logic lives here.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramCallbackWrapper, TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{map_request_error, TelegramBotAdapter};
pub use config::TelegramConfig;
pub use runner::run_dispatcher;
