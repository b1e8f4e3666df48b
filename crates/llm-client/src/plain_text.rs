//! Provider whose endpoint streams the answer as a raw text body.

use crate::chunk::RawChunk;
use crate::error::ProviderError;
use crate::options::{SharedHttpClient, TransportOptions};
use crate::provider::{ChatProvider, RawChunkStream};
use async_trait::async_trait;
use futures::StreamExt;
use prompt::ChatMessage;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Serialize)]
struct PlainTextRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// POSTs `{model, messages, stream: true}` as JSON to `url` and yields body chunks as text.
#[derive(Debug, Clone)]
pub struct PlainTextProvider {
    name: String,
    url: String,
    http: Arc<SharedHttpClient>,
}

impl PlainTextProvider {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            http: Arc::new(SharedHttpClient::default()),
        }
    }
}

#[async_trait]
impl ChatProvider for PlainTextProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, messages, options), fields(provider = %self.name))]
    async fn open_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &TransportOptions,
    ) -> Result<RawChunkStream, ProviderError> {
        info!(model = %model, message_count = messages.len(), url = %self.url, "Plain-text stream request");

        let response = self
            .http
            .get(options)?
            .post(&self.url)
            .json(&PlainTextRequest {
                model,
                messages,
                stream: true,
            })
            .send()
            .await
            .map_err(|e| ProviderError::transport(&self.name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: self.name.clone(),
                status: status.as_u16(),
            });
        }

        let name = self.name.clone();
        let mut body = Box::pin(response.bytes_stream());
        Ok(async_stream::stream! {
            let mut decoder = Utf8StreamDecoder::default();
            while let Some(item) = body.next().await {
                match item {
                    Ok(bytes) => yield Ok(RawChunk::Text(decoder.push(&bytes))),
                    Err(e) => {
                        yield Err(ProviderError::transport(&name, e));
                        return;
                    }
                }
            }
            let rest = decoder.finish();
            if !rest.is_empty() {
                yield Ok(RawChunk::Text(rest));
            }
        }
        .boxed())
    }
}

/// Decodes UTF-8 across arbitrary chunk boundaries; an incomplete trailing sequence waits for
/// the next chunk, invalid bytes become U+FFFD. Call [`finish`](Self::finish) once the body ends.
#[derive(Debug, Default)]
pub(crate) struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(len) => {
                            out.push('\u{FFFD}');
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }

    /// Flushes a sequence the body cut short as a single U+FFFD.
    pub(crate) fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            '\u{FFFD}'.to_string()
        }
    }
}
