//! Per-(room,lang) speech synthesis queue (§4.3): backlog-aware rate
//! control, at-most-once audio per final unit, lookahead-1 pre-synthesis.

pub mod error;
pub mod providers;
pub mod queue;
pub mod synthesizer;
pub mod worker;

pub use error::SynthesisError;
pub use providers::SilentSynthesizer;
pub use queue::{TtsQueue, TtsQueueConfig};
pub use synthesizer::{AudioBuffer, BoxFuture, Synthesizer};
pub use worker::{synthesize_item, SynthesisOutcome};
