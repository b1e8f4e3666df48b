mod chat_relay_handler;

pub use chat_relay_handler::{placeholder_text, ChatRelayHandler};
