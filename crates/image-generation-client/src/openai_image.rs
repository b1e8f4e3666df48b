//! OpenAI-compatible image generation client.

use crate::error::ImageGenerationError;
use crate::generator::{GeneratedImage, ImageGenerator};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateImageRequestArgs, Image, ImageModel, ImageResponseFormat, ImageSize},
    Client,
};
use async_trait::async_trait;
use base64::Engine;
use llm_client::mask_token;
use std::sync::Arc;
use tracing::{info, instrument};

/// Calls `{base_url}/images/generations` with the requested model and asks for a URL.
#[derive(Clone)]
pub struct OpenAiImageClient {
    client: Arc<Client<OpenAIConfig>>,
    size: ImageSize,
    api_key_for_logging: String,
}

impl OpenAiImageClient {
    /// Client for an OpenAI-compatible service at `base_url`.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let api_key_for_logging = mask_token(&api_key);
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            size: ImageSize::S1024x1024,
            api_key_for_logging,
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    #[instrument(skip(self, prompt))]
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<GeneratedImage, ImageGenerationError> {
        info!(
            model = %model,
            size = ?self.size,
            prompt_preview = %prompt.chars().take(100).collect::<String>(),
            api_key = %self.api_key_for_logging,
            "OpenAI image generation request"
        );

        let model = model.to_string();
        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(ImageModel::Other(model))
            .size(self.size)
            .response_format(ImageResponseFormat::Url)
            .n(1)
            .build()
            .map_err(|e| ImageGenerationError::Api(e.to_string()))?;

        let response = self
            .client
            .images()
            .create(request)
            .await
            .map_err(|e| ImageGenerationError::Api(e.to_string()))?;

        match response.data.first().map(|image| image.as_ref()) {
            Some(Image::Url { url, .. }) => {
                info!(image_url = %url, "OpenAI image generation completed");
                Ok(GeneratedImage::Url(url.clone()))
            }
            Some(Image::B64Json { b64_json, .. }) => base64::engine::general_purpose::STANDARD
                .decode(b64_json.as_bytes())
                .map(GeneratedImage::Bytes)
                .map_err(|e| ImageGenerationError::Decode(e.to_string())),
            None => Err(ImageGenerationError::NoImage),
        }
    }
}
