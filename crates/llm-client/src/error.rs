use std::time::Duration;
use thiserror::Error;

/// Failure of one provider invocation. Every variant is fatal for that provider only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Transport error from {provider}: {message}")]
    Transport { provider: String, message: String },

    #[error("HTTP {status} from {provider}")]
    Status { provider: String, status: u16 },

    #[error("{provider} produced nothing for {}s", timeout.as_secs_f32())]
    Timeout { provider: String, timeout: Duration },

    #[error("Rate limit sentinel detected in {provider} output")]
    RateLimited { provider: String },

    #[error("Malformed response from {provider}: {message}")]
    Decode { provider: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    pub fn transport(provider: &str, message: impl ToString) -> Self {
        ProviderError::Transport {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}
