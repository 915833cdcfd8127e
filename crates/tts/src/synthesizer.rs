use std::future::Future;
use std::pin::Pin;

use crate::error::SynthesisError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Synthesized audio ready to broadcast (§4.3 `broadcastAudio`).
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub bytes: Vec<u8>,
    pub format: String,
}

/// Capability interface implemented by concrete speech synthesis backends
/// (§9 "string-keyed polymorphism" redesign flag, same shape as
/// `polyglot_translate::TranslationProvider`).
pub trait Synthesizer: Send + Sync {
    fn name(&self) -> &str;

    fn synthesize<'a>(
        &'a self,
        text: &'a str,
        voice: &'a str,
        rate_multiplier: f32,
    ) -> BoxFuture<'a, Result<AudioBuffer, SynthesisError>>;
}
