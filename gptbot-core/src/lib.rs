//! # gptbot-core
//!
//! Core types and traits for the bot: [`Bot`], [`Handler`], message, callback and keyboard types,
//! the model catalog, and tracing initialization. Transport-agnostic; used by gptbot-telegram,
//! handler-chain and the handler crates.

pub mod bot;
pub mod catalog;
pub mod error;
pub mod keyboard;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{BotError, HandlerError, Result};
pub use keyboard::{InlineButton, InlineKeyboard, Keyboard, ReplyKeyboard};
pub use logger::{init_tracing, LogFormat};
pub use types::{
    CallbackQuery, Chat, Handler, HandlerResponse, Message, PhotoSource,
    ToCoreCallback, ToCoreMessage, ToCoreUser, User,
};
