use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageGenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image API error: {0}")]
    Api(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Generation failed: {0}")]
    Failed(String),

    #[error("Image not ready after {attempts} status checks")]
    Pending { attempts: u32 },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("No image in response")]
    NoImage,
}
