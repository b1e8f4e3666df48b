//! FusionBrain (Kandinsky) client: model lookup, job submission, status polling.

use crate::error::ImageGenerationError;
use crate::generator::{GeneratedImage, ImageGenerator};
use async_trait::async_trait;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_DIMENSIONS: &str = "1024x1024";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_MAX_POLLS: u32 = 10;

/// Preset sizes and the hint appended to the query for each.
const PRESETS: &[(&str, u32, u32, &str)] = &[
    ("1920x1080", 1920, 1080, "Image in UHD style."),
    ("1080x1080", 1080, 1080, "Image in square format."),
    ("1080x1920", 1080, 1920, "Image in vertical format."),
    ("1024x1024", 1024, 1024, "Image in 1024x1024 format."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FusionBrainStyle {
    Kandinsky,
    Uhd,
    Anime,
    #[default]
    Default,
}

impl FusionBrainStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionBrainStyle::Kandinsky => "KANDINSKY",
            FusionBrainStyle::Uhd => "UHD",
            FusionBrainStyle::Anime => "ANIME",
            FusionBrainStyle::Default => "DEFAULT",
        }
    }
}

impl FromStr for FusionBrainStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KANDINSKY" => Ok(FusionBrainStyle::Kandinsky),
            "UHD" => Ok(FusionBrainStyle::Uhd),
            "ANIME" => Ok(FusionBrainStyle::Anime),
            "DEFAULT" => Ok(FusionBrainStyle::Default),
            other => Err(format!("unknown style: {}", other)),
        }
    }
}

/// Parses `WxH`; preset sizes also return their query hint.
fn resolve_dimensions(
    dimensions: &str,
) -> Result<(u32, u32, Option<&'static str>), ImageGenerationError> {
    if let Some((_, w, h, hint)) = PRESETS.iter().find(|(name, ..)| *name == dimensions) {
        return Ok((*w, *h, Some(*hint)));
    }
    let invalid = || ImageGenerationError::InvalidDimensions(dimensions.to_string());
    let (w, h) = dimensions.split_once('x').ok_or_else(invalid)?;
    let width = w.trim().parse().map_err(|_| invalid())?;
    let height = h.trim().parse().map_err(|_| invalid())?;
    Ok((width, height, None))
}

#[derive(Deserialize)]
struct ModelInfo {
    id: i64,
}

#[derive(Deserialize)]
struct RunResponse {
    uuid: Option<String>,
    #[serde(default, alias = "errorDescription")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default, rename = "errorDescription")]
    error_description: Option<String>,
}

#[derive(Clone)]
pub struct FusionBrainClient {
    http: reqwest::Client,
    /// Service root, ending with `/`.
    base_url: String,
    api_key: String,
    secret_key: String,
    style: FusionBrainStyle,
    dimensions: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl FusionBrainClient {
    pub fn new(base_url: &str, api_key: String, secret_key: String) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            secret_key,
            style: FusionBrainStyle::default(),
            dimensions: DEFAULT_DIMENSIONS.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    pub fn with_style(mut self, style: FusionBrainStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_dimensions(mut self, dimensions: impl Into<String>) -> Self {
        self.dimensions = dimensions.into();
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls.max(1);
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorized(self.http.get(format!("{}{}", self.base_url, path)))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("X-Key", format!("Key {}", self.api_key))
            .header("X-Secret", format!("Secret {}", self.secret_key))
    }

    async fn model_id(&self) -> Result<i64, ImageGenerationError> {
        let models: Vec<ModelInfo> = self
            .get("key/api/v1/models")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        models
            .first()
            .map(|m| m.id)
            .ok_or_else(|| ImageGenerationError::Decode("empty model list".to_string()))
    }

    async fn submit(&self, model_id: i64, prompt: &str) -> Result<String, ImageGenerationError> {
        let (width, height, hint) = resolve_dimensions(&self.dimensions)?;
        let query = match hint {
            Some(hint) => format!("{} {}", prompt, hint),
            None => prompt.to_string(),
        };
        let params = json!({
            "type": "GENERATE",
            "numImages": 1,
            "width": width,
            "height": height,
            "generateParams": {
                "query": query,
                "style": self.style.as_str(),
            }
        });
        let params_part = Part::text(params.to_string())
            .mime_str("application/json")
            .map_err(ImageGenerationError::Http)?;
        let form = Form::new()
            .text("model_id", model_id.to_string())
            .part("params", params_part);

        let response: RunResponse = self
            .authorized(
                self.http
                    .post(format!("{}key/api/v1/text2image/run", self.base_url)),
            )
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        match response.uuid {
            Some(uuid) => Ok(uuid),
            None => Err(ImageGenerationError::Api(
                response
                    .error
                    .unwrap_or_else(|| "run response without uuid".to_string()),
            )),
        }
    }

    async fn wait_for_images(&self, uuid: &str) -> Result<Vec<String>, ImageGenerationError> {
        let path = format!("key/api/v1/text2image/status/{}", uuid);
        for attempt in 1..=self.max_polls {
            let status: StatusResponse = self
                .get(&path)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            debug!(uuid = %uuid, attempt, status = %status.status, "Generation status");
            match status.status.as_str() {
                "DONE" => return status.images.ok_or(ImageGenerationError::NoImage),
                "FAIL" => {
                    return Err(ImageGenerationError::Failed(
                        status
                            .error_description
                            .unwrap_or_else(|| "unknown error".to_string()),
                    ))
                }
                _ => {}
            }
            if attempt < self.max_polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
        warn!(uuid = %uuid, attempts = self.max_polls, "Generation not finished in time");
        Err(ImageGenerationError::Pending {
            attempts: self.max_polls,
        })
    }
}

#[async_trait]
impl ImageGenerator for FusionBrainClient {
    #[instrument(skip(self, prompt), fields(style = self.style.as_str(), dimensions = %self.dimensions))]
    async fn generate(
        &self,
        _model: &str,
        prompt: &str,
    ) -> Result<GeneratedImage, ImageGenerationError> {
        let model_id = self.model_id().await?;
        let uuid = self.submit(model_id, prompt).await?;
        info!(model_id, uuid = %uuid, "Kandinsky generation submitted");

        let images = self.wait_for_images(&uuid).await?;
        let first = images.first().ok_or(ImageGenerationError::NoImage)?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(first.as_bytes())
            .map_err(|e| ImageGenerationError::Decode(e.to_string()))?;
        info!(uuid = %uuid, bytes = bytes.len(), "Kandinsky image ready");
        Ok(GeneratedImage::Bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_dimensions() {
        assert_eq!(
            resolve_dimensions("1080x1920").unwrap(),
            (1080, 1920, Some("Image in vertical format."))
        );
        assert_eq!(resolve_dimensions("640x480").unwrap(), (640, 480, None));
        assert!(resolve_dimensions("big").is_err());
        assert!(resolve_dimensions("10xabc").is_err());
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("anime".parse::<FusionBrainStyle>(), Ok(FusionBrainStyle::Anime));
        assert_eq!(FusionBrainStyle::default().as_str(), "DEFAULT");
        assert!("watercolor".parse::<FusionBrainStyle>().is_err());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = FusionBrainClient::new("https://api-key.fusionbrain.ai", "k".into(), "s".into());
        assert_eq!(client.base_url, "https://api-key.fusionbrain.ai/");
    }
}
