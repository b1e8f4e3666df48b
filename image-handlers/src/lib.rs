//! # Image handlers
//!
//! When the user's selected model is an image model, their text becomes an image request: the
//! bot asks whether to enhance the prompt, optionally has a language model rewrite it, then
//! generates and sends the picture.

mod conversation_state;
mod image_handler;

pub use conversation_state::{ConversationState, ConversationStates};
pub use image_handler::{ImageGenerators, ImageHandler, CALLBACK_ENHANCE, CALLBACK_RAW};
