//! Per-call transport options: extra headers and the provider timeout.

use crate::error::ProviderError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Default time to wait for a provider to open a stream or produce its next chunk.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub headers: BTreeMap<String, String>,
    /// Bounds opening the stream and every wait for the next chunk.
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        let headers = [
            (
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            ),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Referer", "https://www.google.com/"),
            ("Origin", "https://www.google.com/"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            headers,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl TransportOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Converts the headers for reqwest, rejecting names or values that are not valid HTTP.
    pub fn header_map(&self) -> Result<HeaderMap, ProviderError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProviderError::InvalidRequest(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ProviderError::InvalidRequest(format!("header {}: {}", name, e)))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// HTTP client carrying these headers; connect attempts are bounded by the timeout.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, ProviderError> {
        reqwest::Client::builder()
            .default_headers(self.header_map()?)
            .connect_timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))
    }
}

/// One reqwest client per provider, shared across calls so connections are pooled.
///
/// The client is rebuilt only when a call arrives with different headers or timeout.
#[derive(Debug, Default)]
pub(crate) struct SharedHttpClient {
    cached: Mutex<Option<CachedClient>>,
}

#[derive(Debug)]
struct CachedClient {
    options: TransportOptions,
    client: reqwest::Client,
    generation: u64,
}

impl SharedHttpClient {
    pub(crate) fn get(&self, options: &TransportOptions) -> Result<reqwest::Client, ProviderError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = cached.as_ref().filter(|entry| entry.options == *options) {
            return Ok(entry.client.clone());
        }
        let client = options.http_client()?;
        let generation = cached.as_ref().map_or(1, |entry| entry.generation + 1);
        debug!(generation, timeout = ?options.timeout, "Built provider HTTP client");
        *cached = Some(CachedClient {
            options: options.clone(),
            client: client.clone(),
            generation,
        });
        Ok(client)
    }

    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |entry| entry.generation)
    }
}
