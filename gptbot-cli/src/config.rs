//! Bot configuration from environment variables (after `.env` is loaded) and CLI overrides.

use anyhow::{Context, Result};
use gptbot_core::LogFormat;
use gptbot_telegram::TelegramConfig;
use image_generation_client::{FusionBrainStyle, DEFAULT_DIMENSIONS};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use stream_relay::RenderConfig;

pub const DEFAULT_DATABASE_URL: &str = "./gptbot.db";
pub const DEFAULT_LOG_FILE: &str = "logs/gptbot.log";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Wire format spoken by one upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI-compatible `chat/completions` with structured SSE chunks.
    OpenAi,
    /// Endpoint streaming the answer as a raw text body.
    PlainText,
}

/// One `kind|url` entry of `LLM_PROVIDERS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    pub url: String,
}

impl FromStr for ProviderSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, url) = s
            .split_once('|')
            .with_context(|| format!("provider entry must be kind|url, got: {}", s))?;
        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "openai" => ProviderKind::OpenAi,
            "text" => ProviderKind::PlainText,
            other => anyhow::bail!("unknown provider kind: {}", other),
        };
        let url = url.trim();
        if url.is_empty() {
            anyhow::bail!("provider entry has an empty url: {}", s);
        }
        Ok(Self {
            kind,
            url: url.to_string(),
        })
    }
}

/// Parses a comma separated provider list in fallback order; blank entries are skipped.
pub fn parse_provider_specs(s: &str) -> Result<Vec<ProviderSpec>> {
    s.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ProviderSpec::from_str)
        .collect()
}

/// Kandinsky (FusionBrain) credentials; present only when all three variables are set.
#[derive(Debug, Clone)]
pub struct FusionBrainConfig {
    pub url: String,
    pub api_key: String,
    pub secret_key: String,
    pub style: FusionBrainStyle,
    pub dimensions: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub database_url: String,
    pub log_file: String,
    pub log_format: LogFormat,
    /// Fallback order.
    pub providers: Vec<ProviderSpec>,
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// `None` when `SYSTEM_PROMPT` is set but blank.
    pub system_prompt: Option<String>,
    pub default_model: String,
    pub start_model: String,
    pub history_limit: usize,
    pub provider_timeout: Duration,
    pub render: RenderConfig,
    pub require_non_empty: bool,
    pub rate_limit_sentinel: String,
    pub image_api_key: String,
    pub image_base_url: String,
    pub fusion_brain: Option<FusionBrainConfig>,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, value, e)),
        None => Ok(default),
    }
}

impl BotConfig {
    /// Loads from the process environment. `token` overrides `BOT_TOKEN` when provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        Self::from_lookup(token, |name| env::var(name).ok())
    }

    /// Same as [`BotConfig::load`], reading variables through `lookup`.
    pub fn from_lookup(
        token: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bot_token = token
            .or_else(|| get("BOT_TOKEN"))
            .context("BOT_TOKEN not set (use --token or the BOT_TOKEN variable)")?;
        let telegram = TelegramConfig::with_token(bot_token)
            .with_api_url(get("TELEGRAM_API_URL").or_else(|| get("TELOXIDE_API_URL")));

        let openai_api_key = get("OPENAI_API_KEY").unwrap_or_default();
        let openai_base_url =
            get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        let providers = match get("LLM_PROVIDERS") {
            Some(list) => parse_provider_specs(&list).context("Invalid LLM_PROVIDERS")?,
            None => vec![ProviderSpec {
                kind: ProviderKind::OpenAi,
                url: openai_base_url.clone(),
            }],
        };

        let defaults = RenderConfig::default();
        let render = RenderConfig {
            interval: Duration::from_millis(parse_or(
                &lookup,
                "RENDER_INTERVAL_MS",
                defaults.interval.as_millis() as u64,
            )?),
            max_len: parse_or(&lookup, "RENDER_MAX_LEN", defaults.max_len)?,
            receive_timeout: Duration::from_secs(parse_or(
                &lookup,
                "RELAY_TIMEOUT_SECS",
                defaults.receive_timeout.as_secs(),
            )?),
            max_render_attempts: parse_or(
                &lookup,
                "RENDER_MAX_ATTEMPTS",
                defaults.max_render_attempts,
            )?,
            ..defaults
        };

        let fusion_brain = match (
            get("FUSIONBRAIN_URL"),
            get("FUSIONBRAIN_API_KEY"),
            get("FUSIONBRAIN_SECRET_KEY"),
        ) {
            (Some(url), Some(api_key), Some(secret_key)) => Some(FusionBrainConfig {
                url,
                api_key,
                secret_key,
                style: get("FUSIONBRAIN_STYLE")
                    .map(|s| s.parse::<FusionBrainStyle>())
                    .transpose()
                    .map_err(|e| anyhow::anyhow!("Invalid FUSIONBRAIN_STYLE: {}", e))?
                    .unwrap_or_default(),
                dimensions: get("FUSIONBRAIN_DIMENSIONS")
                    .unwrap_or_else(|| DEFAULT_DIMENSIONS.to_string()),
            }),
            _ => None,
        };

        let system_prompt = match lookup("SYSTEM_PROMPT") {
            Some(prompt) if prompt.trim().is_empty() => None,
            Some(prompt) => Some(prompt),
            None => Some(prompt::DEFAULT_SYSTEM_MESSAGE.to_string()),
        };

        Ok(Self {
            telegram,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            log_file: get("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Text)?,
            providers,
            image_api_key: get("IMAGE_API_KEY").unwrap_or_else(|| openai_api_key.clone()),
            image_base_url: get("IMAGE_BASE_URL").unwrap_or_else(|| openai_base_url.clone()),
            openai_api_key,
            openai_base_url,
            system_prompt,
            default_model: get("DEFAULT_MODEL")
                .unwrap_or_else(|| storage::DEFAULT_MODEL.to_string()),
            start_model: get("START_MODEL")
                .unwrap_or_else(|| handlers::DEFAULT_START_MODEL.to_string()),
            history_limit: parse_or(&lookup, "HISTORY_LIMIT", storage::DEFAULT_HISTORY_LIMIT)?,
            provider_timeout: Duration::from_secs(parse_or(
                &lookup,
                "PROVIDER_TIMEOUT_SECS",
                llm_client::DEFAULT_PROVIDER_TIMEOUT.as_secs(),
            )?),
            render,
            require_non_empty: parse_or(&lookup, "REQUIRE_NON_EMPTY", true)?,
            rate_limit_sentinel: get("RATE_LIMIT_SENTINEL")
                .unwrap_or_else(|| llm_client::DEFAULT_RATE_LIMIT_SENTINEL.to_string()),
            fusion_brain,
        })
    }

    /// Rejects values that would only fail later at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            anyhow::bail!("LLM_PROVIDERS lists no providers");
        }
        if self.render.max_len == 0 {
            anyhow::bail!("RENDER_MAX_LEN must be greater than zero");
        }
        if self.render.max_render_attempts == 0 {
            anyhow::bail!("RENDER_MAX_ATTEMPTS must be at least 1");
        }
        if let Some(url) = &self.telegram.telegram_api_url {
            if reqwest::Url::parse(url).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url
                );
            }
        }
        Ok(())
    }
}

/// `DATABASE_URL` or the default; maintenance commands need nothing else.
pub fn database_url_from_env() -> String {
    env::var("DATABASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}
