//! Scripted [`llm_client::ChatProvider`] for sequencer and relay tests.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use llm_client::{ChatProvider, ProviderError, RawChunk, RawChunkStream, TransportOptions};
use prompt::ChatMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[allow(dead_code)]
pub enum Script {
    /// Yields these chunks, then ends.
    Chunks(Vec<Result<RawChunk, ProviderError>>),
    /// Fails to open.
    Fail,
    /// Opens and never yields; sets the flag when the stream is dropped.
    Stall(Arc<AtomicBool>),
}

pub struct ScriptedProvider {
    name: String,
    script: Script,
    /// Names of providers in the order they were opened, shared across a test's providers.
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(name: &str, script: Script, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn ChatProvider> {
        Arc::new(Self {
            name: name.to_string(),
            script,
            log: Arc::clone(log),
        })
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[allow(dead_code)]
pub fn deltas(parts: &[&str]) -> Script {
    Script::Chunks(
        parts
            .iter()
            .map(|p| Ok(RawChunk::Text(p.to_string())))
            .collect(),
    )
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open_stream(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
        _options: &TransportOptions,
    ) -> Result<RawChunkStream, ProviderError> {
        self.log.lock().unwrap().push(self.name.clone());
        match &self.script {
            Script::Chunks(items) => Ok(stream::iter(items.clone()).boxed()),
            Script::Fail => Err(ProviderError::transport(&self.name, "connection refused")),
            Script::Stall(dropped) => {
                let guard = DropFlag(Arc::clone(dropped));
                Ok(stream::pending::<Result<RawChunk, ProviderError>>()
                    .map(move |item| {
                        let _ = &guard;
                        item
                    })
                    .boxed())
            }
        }
    }
}
