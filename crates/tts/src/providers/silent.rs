use crate::error::SynthesisError;
use crate::synthesizer::{AudioBuffer, BoxFuture, Synthesizer};

/// A synthesizer that produces no audio at all. Used when no real TTS
/// backend is configured so the room pipeline still runs end-to-end in
/// local development; text-only broadcast proceeds exactly as it would on
/// synthesis failure (§4.3 failure semantics).
pub struct SilentSynthesizer;

impl Synthesizer for SilentSynthesizer {
    fn name(&self) -> &str {
        "silent"
    }

    fn synthesize<'a>(
        &'a self,
        _text: &'a str,
        _voice: &'a str,
        _rate_multiplier: f32,
    ) -> BoxFuture<'a, Result<AudioBuffer, SynthesisError>> {
        Box::pin(async move {
            Ok(AudioBuffer {
                bytes: Vec::new(),
                format: "mp3".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn produces_empty_audio() {
        let synth = SilentSynthesizer;
        let audio = synth.synthesize("hello", "default", 1.0).await.unwrap();
        assert!(audio.bytes.is_empty());
    }
}
