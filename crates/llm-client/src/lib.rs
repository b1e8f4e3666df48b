//! # LLM provider adapter
//!
//! Defines the [`ChatProvider`] trait (one upstream streaming chat completion per call) and
//! [`stream_deltas`], which turns a provider's raw chunk stream into plain text deltas:
//! chunk shapes are normalized through [`RawChunk`], unknown shapes are logged and skipped, and
//! the rate-limit [`RateLimitSentinel`] turns matching output into [`ProviderError::RateLimited`].
//!
//! Implementations: [`OpenAiCompatibleProvider`] (structured chunks via async-openai) and
//! [`PlainTextProvider`] (raw text body). No retries happen here; fallback across providers is
//! the caller's job.

mod chunk;
mod error;
mod openai;
mod options;
mod plain_text;
mod provider;
mod sentinel;

pub use chunk::RawChunk;
pub use error::ProviderError;
pub use openai::{mask_token, OpenAiCompatibleProvider};
pub use options::{TransportOptions, DEFAULT_PROVIDER_TIMEOUT};
pub use plain_text::PlainTextProvider;
pub use provider::{collect_text, stream_deltas, ChatProvider, DeltaStream, RawChunkStream};
pub use sentinel::{RateLimitSentinel, DEFAULT_RATE_LIMIT_SENTINEL};
