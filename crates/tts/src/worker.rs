use polyglot_core::{Telemetry, TtsState};

use crate::queue::TtsQueue;
use crate::synthesizer::{AudioBuffer, Synthesizer};

/// Result of one synthesis attempt, handed to the room actor for broadcast
/// (§4.3 `broadcastAudio`).
pub struct SynthesisOutcome {
    pub unit_id: String,
    pub lang: String,
    pub audio: Option<AudioBuffer>,
}

/// Drive one item through `queued -> synthesizing -> ready`, retrying once
/// with the fallback voice on failure before giving up text-only (§4.3
/// failure semantics, §7 transient-provider policy).
pub async fn synthesize_item(
    queue: &mut TtsQueue,
    synthesizer: &dyn Synthesizer,
    telemetry: &Telemetry,
    unit_id: &str,
) -> Option<SynthesisOutcome> {
    let item = queue.get(unit_id)?.clone();
    queue.transition(unit_id, TtsState::Synthesizing).ok();

    let rate = item.profile.rate_multiplier(queue.rate_boost_pct());

    let first = synthesizer.synthesize(&item.text, &item.voice, rate).await;
    let audio = match first {
        Ok(audio) => Some(audio),
        Err(e) if e.is_auth() => {
            telemetry.record_tts_synthesis_failed(&item.lang);
            None
        }
        Err(_) => {
            let fallback_voice = queue.fallback_voice().to_string();
            match synthesizer.synthesize(&item.text, &fallback_voice, rate).await {
                Ok(audio) => Some(audio),
                Err(_) => {
                    telemetry.record_tts_synthesis_failed(&item.lang);
                    None
                }
            }
        }
    };

    match &audio {
        Some(_) => {
            queue.transition(unit_id, TtsState::Ready).ok();
        }
        None => {
            // Second failure: marked done with no audio; broadcast proceeds
            // text-only at the room layer (§4.3).
            queue.transition(unit_id, TtsState::Done).ok();
        }
    }

    Some(SynthesisOutcome {
        unit_id: item.unit_id,
        lang: item.lang,
        audio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SynthesisError;
    use crate::queue::TtsQueueConfig;
    use crate::synthesizer::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn config() -> TtsQueueConfig {
        TtsQueueConfig {
            max_backlog_ms: 8_000,
            resume_backlog_ms: 4_000,
            rate_boost_pct: 25,
            default_voice: "default".to_string(),
            fallback_voice: "fallback".to_string(),
        }
    }

    struct FlakySynth {
        calls: Arc<AtomicUsize>,
        succeed_on_call: usize,
    }

    impl Synthesizer for FlakySynth {
        fn name(&self) -> &str {
            "flaky"
        }

        fn synthesize<'a>(
            &'a self,
            _text: &'a str,
            voice: &'a str,
            _rate_multiplier: f32,
        ) -> BoxFuture<'a, Result<AudioBuffer, SynthesisError>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let succeed = n >= self.succeed_on_call;
            let voice = voice.to_string();
            Box::pin(async move {
                if succeed {
                    Ok(AudioBuffer {
                        bytes: vec![1, 2, 3],
                        format: "mp3".to_string(),
                    })
                } else {
                    Err(SynthesisError::Http {
                        provider: voice,
                        status: 500,
                    })
                }
            })
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let mut queue = TtsQueue::new("room1", "es-MX", config());
        queue.enqueue("s|en|0", "hola", 1000, 0).unwrap();
        let synth = FlakySynth {
            calls: Arc::new(AtomicUsize::new(0)),
            succeed_on_call: 1,
        };
        let telemetry = Telemetry::new();

        let outcome = synthesize_item(&mut queue, &synth, &telemetry, "s|en|0")
            .await
            .unwrap();
        assert!(outcome.audio.is_some());
        assert_eq!(queue.get("s|en|0").unwrap().state, TtsState::Ready);
    }

    #[tokio::test]
    async fn retries_once_with_fallback_voice_then_succeeds() {
        let mut queue = TtsQueue::new("room1", "es-MX", config());
        queue.enqueue("s|en|0", "hola", 1000, 0).unwrap();
        let synth = FlakySynth {
            calls: Arc::new(AtomicUsize::new(0)),
            succeed_on_call: 2,
        };
        let telemetry = Telemetry::new();

        let outcome = synthesize_item(&mut queue, &synth, &telemetry, "s|en|0")
            .await
            .unwrap();
        assert!(outcome.audio.is_some());
        assert_eq!(synth.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_failure_marks_done_text_only() {
        let mut queue = TtsQueue::new("room1", "es-MX", config());
        queue.enqueue("s|en|0", "hola", 1000, 0).unwrap();
        let synth = FlakySynth {
            calls: Arc::new(AtomicUsize::new(0)),
            succeed_on_call: 99,
        };
        let telemetry = Telemetry::new();

        let outcome = synthesize_item(&mut queue, &synth, &telemetry, "s|en|0")
            .await
            .unwrap();
        assert!(outcome.audio.is_none());
        assert_eq!(queue.get("s|en|0").unwrap().state, TtsState::Done);
        assert_eq!(telemetry.snapshot().tts_synthesis_failed_by_lang["es-MX"], 1);
    }
}
