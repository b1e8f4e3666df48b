//! # Prompt
//!
//! Chat message types sent to language-model providers, and assembly of a conversation from a
//! system instruction, prior turns and the new user input.
//!
//! ## Ordering
//!
//! A conversation is chronological, oldest first. [`build_conversation`] never reorders its
//! inputs; providers see exactly the order the store returned.

use serde::{Deserialize, Serialize};

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Default system instruction when no custom system message is configured.
pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant. Reply in the language the user writes in.";

/// Instruction used to turn a user's image request into an English generation prompt.
pub const IMAGE_PROMPT_INSTRUCTION: &str =
    "Translate into English and create a detailed prompt for image generation based on this text. Send only the prompt:";

/// Builds the message list for one request: optional system message, prior turns in the given
/// order, then the new user input.
///
/// Empty or whitespace-only system messages are skipped.
pub fn build_conversation<I>(system: Option<&str>, history: I, user_input: &str) -> Vec<ChatMessage>
where
    I: IntoIterator<Item = ChatMessage>,
{
    let mut messages = Vec::new();
    if let Some(system) = system.filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.extend(history);
    messages.push(ChatMessage::user(user_input));
    messages
}

/// Single-turn request asking the model to write an image-generation prompt for `user_text`.
pub fn image_prompt_request(user_text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "{} {}",
        IMAGE_PROMPT_INSTRUCTION, user_text
    ))]
}

/// Prompt used when the model could not enhance the user's text.
pub fn fallback_image_prompt(user_text: &str) -> String {
    format!(
        "Generate an image based on the following description: {}",
        user_text
    )
}
