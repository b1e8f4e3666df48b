//! # Image generation clients
//!
//! [`ImageGenerator`] produces one image for a prompt. Two implementations:
//!
//! - [`OpenAiImageClient`]: OpenAI-compatible `images/generations`, returns a URL (or bytes when
//!   the server answers with base64).
//! - [`FusionBrainClient`]: the FusionBrain Kandinsky job API (model lookup, run, status poll),
//!   returns decoded image bytes.

mod error;
mod fusion_brain;
mod generator;
mod openai_image;

pub use error::ImageGenerationError;
pub use fusion_brain::{FusionBrainClient, FusionBrainStyle, DEFAULT_DIMENSIONS};
pub use generator::{GeneratedImage, ImageGenerator};
pub use openai_image::OpenAiImageClient;
