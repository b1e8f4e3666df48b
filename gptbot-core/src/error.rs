//! Error types shared by the bot transport and handlers.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Bot error: {0}")]
    Bot(String),

    /// The host asked us to slow down; retrying after the given duration is expected to succeed.
    #[error("Retry after {}s", .0.as_secs())]
    RetryAfter(Duration),

    /// The edit carried the same text the message already shows.
    #[error("Message is not modified")]
    NotModified,

    /// The user blocked the bot, deactivated, or the chat is gone.
    #[error("Recipient unreachable: {0}")]
    RecipientUnreachable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Wait duration requested by the host, if this is a rate-limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            BotError::RetryAfter(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_recipient_unreachable(&self) -> bool {
        matches!(self, BotError::RecipientUnreachable(_))
    }
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No text in message")]
    NoText,

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Empty content")]
    EmptyContent,
}

pub type Result<T> = std::result::Result<T, BotError>;
