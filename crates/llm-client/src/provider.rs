//! The provider trait and the normalizing delta stream built on top of it.

use crate::chunk::RawChunk;
use crate::error::ProviderError;
use crate::options::TransportOptions;
use crate::sentinel::RateLimitSentinel;
use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use prompt::ChatMessage;
use std::sync::Arc;
use tracing::{debug, warn};

/// Raw upstream items, before normalization.
pub type RawChunkStream = BoxStream<'static, Result<RawChunk, ProviderError>>;

/// Normalized text deltas. The stream ends after the first error.
pub type DeltaStream = BoxStream<'static, Result<String, ProviderError>>;

/// One upstream language-model backend capable of streaming chat completions.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Sends one request and returns the upstream chunk stream. Exactly one outbound request per call.
    async fn open_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &TransportOptions,
    ) -> Result<RawChunkStream, ProviderError>;
}

/// Streams text deltas from `provider`.
///
/// Each raw chunk is normalized with [`RawChunk::into_delta`]; unrecognized shapes are logged and
/// skipped without ending the stream. Every delta is checked against `sentinel` before it is
/// yielded, and the full response is checked once more at the end, so a sentinel split across
/// chunks is still reported as [`ProviderError::RateLimited`]. `options.timeout` bounds opening
/// the stream and each wait for the next chunk.
pub fn stream_deltas(
    provider: Arc<dyn ChatProvider>,
    model: String,
    messages: Vec<ChatMessage>,
    options: TransportOptions,
    sentinel: RateLimitSentinel,
) -> DeltaStream {
    let stream = try_stream! {
        let name = provider.name().to_string();
        let timeout = options.timeout;
        let timed_out = |name: &str| ProviderError::Timeout {
            provider: name.to_string(),
            timeout,
        };

        let mut raw = tokio::time::timeout(timeout, provider.open_stream(&model, &messages, &options))
            .await
            .map_err(|_| timed_out(&name))??;

        let mut full_response = String::new();
        loop {
            let next = tokio::time::timeout(timeout, raw.next())
                .await
                .map_err(|_| timed_out(&name))?;
            let chunk = match next {
                Some(item) => item?,
                None => break,
            };
            debug!(provider = %name, chunk = ?chunk, "Received chunk");

            let delta = match chunk {
                RawChunk::Unrecognized(description) => {
                    warn!(provider = %name, chunk = %description, "Unrecognized chunk shape, skipped");
                    continue;
                }
                other => match other.into_delta() {
                    Some(delta) => delta,
                    None => continue,
                },
            };

            if sentinel.is_hit(&delta) {
                warn!(provider = %name, "Rate limit sentinel in delta");
                Err::<(), _>(ProviderError::RateLimited { provider: name.clone() })?;
            }
            full_response.push_str(&delta);
            yield delta;
        }

        if sentinel.is_hit(&full_response) {
            warn!(provider = %name, "Rate limit sentinel in full response");
            Err::<(), _>(ProviderError::RateLimited { provider: name.clone() })?;
        }
    };
    stream.boxed()
}

/// Drains a delta stream into one string, stopping at the first error.
pub async fn collect_text(mut deltas: DeltaStream) -> Result<String, ProviderError> {
    let mut text = String::new();
    while let Some(delta) = deltas.next().await {
        text.push_str(&delta?);
    }
    Ok(text)
}
