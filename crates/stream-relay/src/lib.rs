//! # Stream relay
//!
//! Moves a streamed completion from a language-model provider into one editable chat message.
//!
//! - [`FallbackSequencer`] (producer) tries providers in order and pushes [`RelayMessage`]s.
//! - [`relay_channel`] is the single-producer single-consumer hand-off queue.
//! - [`ThrottledRenderer`] (consumer) accumulates deltas and edits the message at most once per
//!   interval, truncating to the host's length limit and honoring retry-after.
//! - [`Relay::relay_reply`] wires the three together for one request and persists the reply.

mod driver;
mod message;
mod queue;
mod renderer;
mod sequencer;

pub use driver::{Relay, RelayRequest};
pub use message::RelayMessage;
pub use queue::{relay_channel, RecvOutcome, RelayReceiver, RelaySender};
pub use renderer::{truncate_head, RelayOutcome, RenderConfig, ThrottledRenderer};
pub use sequencer::{
    FallbackSequencer, SequencerOutcome, SequencerState, ALL_PROVIDERS_UNAVAILABLE,
};
