//! Fallback sequencer: tries providers one at a time, in order, and feeds the relay queue.

use crate::message::RelayMessage;
use crate::queue::RelaySender;
use futures::StreamExt;
use llm_client::{
    collect_text, stream_deltas, ChatProvider, ProviderError, RateLimitSentinel,
    TransportOptions,
};
use prompt::ChatMessage;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Cause carried by the terminal [`RelayMessage::Error`] when no provider succeeded.
pub const ALL_PROVIDERS_UNAVAILABLE: &str = "all providers unavailable";

/// Position of the sequencer in the provider list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Trying(usize),
    Success,
    ExhaustedFailure,
}

/// How a [`FallbackSequencer::run`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerOutcome {
    /// A provider produced a non-empty response; `End` was pushed.
    Completed { provider: String },
    /// A provider finished with no text and empty completions are accepted; nothing terminal pushed.
    EmptyCompletion { provider: String },
    /// Every provider failed; one `Error` was pushed.
    Exhausted,
    /// The receiver went away mid-stream.
    ConsumerGone,
}

enum Attempt {
    Produced,
    Empty,
    Failed(ProviderError),
    ConsumerGone,
}

/// Ordered provider list plus the policy applied to each attempt.
pub struct FallbackSequencer {
    providers: Vec<Arc<dyn ChatProvider>>,
    options: TransportOptions,
    sentinel: RateLimitSentinel,
    require_non_empty: bool,
}

impl FallbackSequencer {
    pub fn new(providers: Vec<Arc<dyn ChatProvider>>) -> Self {
        Self {
            providers,
            options: TransportOptions::default(),
            sentinel: RateLimitSentinel::default(),
            require_non_empty: true,
        }
    }

    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_sentinel(mut self, sentinel: RateLimitSentinel) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// When `true` (default), a completion with no non-whitespace text counts as a provider failure.
    pub fn with_require_non_empty(mut self, require_non_empty: bool) -> Self {
        self.require_non_empty = require_non_empty;
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Runs the sequencer on its own task.
    pub fn spawn(
        self: Arc<Self>,
        model: String,
        messages: Vec<ChatMessage>,
        tx: RelaySender,
    ) -> JoinHandle<SequencerOutcome> {
        tokio::spawn(async move { self.run(&model, &messages, &tx).await })
    }

    /// Streams one response into `tx`, falling back across providers on failure.
    ///
    /// Each delta is pushed as soon as it arrives. Deltas pushed by a provider that later fails
    /// stay in the queue.
    #[instrument(skip(self, messages, tx), fields(providers = self.providers.len()))]
    pub async fn run(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tx: &RelaySender,
    ) -> SequencerOutcome {
        let mut state = SequencerState::Trying(0);
        let mut winner = String::new();

        while let SequencerState::Trying(index) = state {
            state = match self.providers.get(index) {
                None => SequencerState::ExhaustedFailure,
                Some(provider) => {
                    info!(provider = %provider.name(), attempt = index + 1, "Trying provider");
                    match self.attempt(provider, model, messages, tx).await {
                        Attempt::Produced => {
                            winner = provider.name().to_string();
                            SequencerState::Success
                        }
                        Attempt::Empty if !self.require_non_empty => {
                            info!(provider = %provider.name(), "Provider finished without text");
                            return SequencerOutcome::EmptyCompletion {
                                provider: provider.name().to_string(),
                            };
                        }
                        Attempt::Empty => {
                            warn!(provider = %provider.name(), "Provider returned an empty response");
                            SequencerState::Trying(index + 1)
                        }
                        Attempt::Failed(e) => {
                            warn!(provider = %provider.name(), error = %e, "Provider failed");
                            SequencerState::Trying(index + 1)
                        }
                        Attempt::ConsumerGone => {
                            info!("Relay receiver dropped, stopping");
                            return SequencerOutcome::ConsumerGone;
                        }
                    }
                }
            };
        }

        if state == SequencerState::Success {
            info!(provider = %winner, "Response completed");
            if !tx.push(RelayMessage::End) {
                return SequencerOutcome::ConsumerGone;
            }
            return SequencerOutcome::Completed { provider: winner };
        }

        error!("All providers failed");
        tx.push(RelayMessage::Error(ALL_PROVIDERS_UNAVAILABLE.to_string()));
        SequencerOutcome::Exhausted
    }

    async fn attempt(
        &self,
        provider: &Arc<dyn ChatProvider>,
        model: &str,
        messages: &[ChatMessage],
        tx: &RelaySender,
    ) -> Attempt {
        let mut deltas = stream_deltas(
            Arc::clone(provider),
            model.to_string(),
            messages.to_vec(),
            self.options.clone(),
            self.sentinel.clone(),
        );
        let mut response = String::new();
        while let Some(item) = deltas.next().await {
            match item {
                Ok(delta) => {
                    response.push_str(&delta);
                    if !tx.push(RelayMessage::Delta(delta)) {
                        return Attempt::ConsumerGone;
                    }
                }
                Err(e) => return Attempt::Failed(e),
            }
        }
        if response.trim().is_empty() {
            Attempt::Empty
        } else {
            Attempt::Produced
        }
    }

    /// Same fallback policy without a queue: returns the first acceptable full response, or the
    /// last provider error when every provider fails.
    #[instrument(skip(self, messages))]
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        let mut last_error = ProviderError::InvalidRequest("no providers configured".to_string());
        for provider in &self.providers {
            let deltas = stream_deltas(
                Arc::clone(provider),
                model.to_string(),
                messages.to_vec(),
                self.options.clone(),
                self.sentinel.clone(),
            );
            match collect_text(deltas).await {
                Ok(text) if !self.require_non_empty || !text.trim().is_empty() => return Ok(text),
                Ok(_) => {
                    warn!(provider = %provider.name(), "Provider returned an empty response");
                    last_error = ProviderError::Decode {
                        provider: provider.name().to_string(),
                        message: "empty response".to_string(),
                    };
                }
                Err(e) => {
                    warn!(provider = %provider.name(), error = %e, "Provider failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}
