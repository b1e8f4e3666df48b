use crate::error::ImageGenerationError;
use async_trait::async_trait;

/// A generated image: a URL the messaging host can fetch itself, or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    Url(String),
    Bytes(Vec<u8>),
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates one image for `prompt` with `model`. Implementations with a single fixed model
    /// ignore `model`.
    async fn generate(&self, model: &str, prompt: &str)
        -> Result<GeneratedImage, ImageGenerationError>;
}
